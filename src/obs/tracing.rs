// self
use crate::{_prelude::*, auth::OwnerId, obs::FlowKind, provider::ProviderEndpoint};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by broker flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth1_broker.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Reports that the identity lookup fell back to an empty remote identity.
pub fn warn_identity_unavailable(owner: &OwnerId, reason: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			owner = %owner,
			reason,
			"Identity lookup failed; storing the access token without a remote identity."
		);
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (owner, reason);
	}
}

/// Reports a non-success status returned by a provider endpoint.
pub fn warn_upstream_rejected(endpoint: ProviderEndpoint, status: u16) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(endpoint = endpoint.as_str(), status, "Provider rejected the call.");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (endpoint, status);
	}
}
