pub mod download;

pub use download::{Downloader, decompress_gz_file, is_gzip, load_json};
