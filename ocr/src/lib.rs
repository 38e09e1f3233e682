mod device;
mod ocr;
mod pp_ocr;
mod preprocess;
mod visualize;

pub use device::Device;
pub use ocr::{Ocr, OcrResult, TextBoundary};
pub use pp_ocr::{PPOcr, ctc_decode};
pub use preprocess::RecPreprocess;
pub use visualize::{ImageVisualizer, Visualizer};
