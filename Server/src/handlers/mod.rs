pub mod mp4_meta;
