//! Record source and sink for `.hyb` files.

pub mod hyb;
