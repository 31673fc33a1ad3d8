pub mod watermark;
