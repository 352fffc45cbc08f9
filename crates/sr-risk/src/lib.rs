//! `sr-risk` — risk model seam and per-edge risk annotation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`model`]     | `RiskModel` trait (`predict_batch`, `predict_one`)          |
//! | [`logistic`]  | `LogisticRiskModel` — JSON artifact, sigmoid output         |
//! | [`constant`]  | `ConstantRiskModel` — fixed score for tests and bootstrap   |
//! | [`handle`]    | `ModelHandle` — load-once, shared-read model access          |
//! | [`annotator`] | `EdgeRiskAnnotator`, `EdgeWeights`, `Annotation`            |
//! | [`scoring`]   | `score_point` for single-coordinate queries                 |
//! | [`error`]     | `RiskError`, `RiskResult<T>`                                |
//!
//! # Design notes
//!
//! The model is the only long-lived shared state in the engine.  It is
//! reached exclusively through [`ModelHandle`], which loads it once and
//! hands out `Arc` clones; nothing in this crate writes to it after load.
//! Everything an annotation produces is owned by the calling request.

pub mod annotator;
pub mod constant;
pub mod error;
pub mod handle;
pub mod logistic;
pub mod model;
pub mod scoring;


pub use annotator::{Annotation, EdgeRiskAnnotator, EdgeWeights, NEUTRAL_RISK};
pub use constant::ConstantRiskModel;
pub use error::{RiskError, RiskResult};
pub use handle::ModelHandle;
pub use logistic::LogisticRiskModel;
pub use model::RiskModel;
pub use scoring::score_point;
