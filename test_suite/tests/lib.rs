mod common;
mod helpers;
mod manifest;
