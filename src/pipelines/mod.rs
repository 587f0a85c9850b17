pub mod sca;
pub mod seg_preproc;

pub use sca::{ExtractionSpace, create_sca};
pub use seg_preproc::{TissueClass, create_seg_preproc};
