//! # classify-gateway
//!
//! A retry-governed gateway to LLM classification APIs, paired with a
//! tolerant extractor that recovers structured per-document records from
//! free-form model output.
//!
//! Two collaborating components, usable independently:
//!
//! - **Model gateway** ([`ModelGateway`]): builds a provider-specific request
//!   body from a (prompt, documents, tags) triple, sends it, classifies the
//!   HTTP response, and retries on rate limiting with capped exponential
//!   backoff honoring a server `Retry-After` hint.
//! - **Result extractor** ([`extract::parse`]): scans raw model text for the
//!   first balanced JSON span and normalizes it into
//!   [`ClassificationRecord`]s, falling back to the raw text when parsing is
//!   not possible.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use classify_gateway::{
//!     ClassificationRequest, Document, GatewayResult, ModelGateway, ProviderConfig, ProviderId,
//! };
//!
//! #[tokio::main]
//! async fn main() -> classify_gateway::Result<()> {
//!     let gateway = ModelGateway::new()?;
//!     let config = ProviderConfig::from_env(ProviderId::OpenAi)?;
//!
//!     let request = ClassificationRequest::with_default_prompt(
//!         vec![Document::new("notes.txt", "Ten usability heuristics...")],
//!         vec!["Usability".into(), "Accessibility".into()],
//!     );
//!
//!     match gateway.classify(&config, &request).await {
//!         GatewayResult::Structured(records) => {
//!             for record in records {
//!                 println!("{}: {:?}", record.document_name, record.assigned_tags);
//!             }
//!         }
//!         GatewayResult::RawText(text) => println!("{text}"),
//!         GatewayResult::Failure { kind, message } => {
//!             eprintln!("classification failed ({kind:?}): {message}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`gateway`] | Retry-governed classify pipeline |
//! | [`extract`] | Tolerant structured-result extraction |
//! | [`drivers`] | Provider envelope adapters (OpenAI, Gemini) |
//! | [`config`] | Per-call provider configuration |
//! | [`prompt`] | Document enumeration and format instructions |
//! | [`notify`] | Injected progress-notification sink |
//! | [`types`] | Call-scoped value objects |

pub mod config;
pub mod drivers;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod notify;
pub mod prompt;
pub mod types;

mod transport;

pub use config::{AuthMode, ProviderConfig, ProviderId};
pub use error::{Error, Result};
pub use gateway::ModelGateway;
pub use notify::{noop_sink, MemorySink, NoopSink, NotificationSink, TracingSink};
pub use types::{
    ClassificationRecord, ClassificationRequest, Document, FailureKind, GatewayResult,
};
