mod common;
mod image;
