//! Core data types for hybrid reads.
//!
//! - [`Segment`](segment::Segment): one ligated half of a read, with its biotype once classified
//! - [`HybRecord`](record::HybRecord): a hybrid read with classification, miRNA analysis and property queries
//! - [`SegmentSide`](types::SegmentSide), [`MirnaTypes`](types::MirnaTypes),
//!   [`PropertyCategory`](types::PropertyCategory): shared vocabulary
//!
//! ## Record lifecycle
//!
//! | Step | Method | Sets |
//! |------|--------|------|
//! | parse | `HybReader` | id, segments, passthrough flags |
//! | classify | `find_seg_types` | segment biotypes, `seg1_type`, `seg2_type` |
//! | analyse | `mirna_analysis` | `mirna_seg`, `target_seg` |
//!
//! Each step requires the previous one; running out of order is an
//! `Error::PrecursorState`.

pub mod record;
pub mod segment;
pub mod types;
