use std::{env, fs};

use cinematch_back::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let json = ApiDoc::openapi().to_pretty_json().unwrap();
    match env::args().nth(1) {
        Some(path) => fs::write(path, json).unwrap(),
        None => println!("{json}"),
    }
}
