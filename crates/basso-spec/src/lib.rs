//! Basso settings library
//!
//! This crate provides the shared value types for Basso: the voice settings
//! threaded through every processing request, their validation, the report
//! produced for each processed message and the `BackendError` trait the
//! backend crates implement.
//!
//! # Example
//!
//! ```
//! use basso_spec::{validate_settings, VoiceSettings};
//!
//! let settings = VoiceSettings::default()
//!     .with_pitch(-4.0)
//!     .unwrap()
//!     .with_formant(0.9)
//!     .unwrap();
//!
//! assert!(validate_settings(&settings).is_ok());
//! assert_eq!(settings.encode_filter_chain(), "bass=g=8:f=120:w=0.3,lowpass=f=8000");
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error codes, validation errors and the `BackendError` trait
//! - [`settings`]: `VoiceSettings` and environment loading
//! - [`validation`]: Settings validation
//! - [`report`]: Per-request processing report

pub mod error;
pub mod report;
pub mod settings;
pub mod validation;

// Re-export commonly used types at the crate root
pub use error::{BackendError, ErrorCode, SettingsError, ValidationError, ValidationResult};
pub use report::{ProcessReport, StageTiming};
pub use settings::{VoiceSettings, FORMANT_WARP_MAX, FORMANT_WARP_MIN};
pub use validation::{duration_within_limit, validate_settings};
