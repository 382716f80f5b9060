use utoipa::OpenApi;

fn main() {
    let spec = huddle_server::routes::ApiDoc::openapi()
        .to_pretty_json()
        .expect("serialize OpenAPI document");
    let out = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../specs/huddle-server.json");
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent).expect("create specs directory");
    }
    std::fs::write(&out, spec).expect("write OpenAPI document");
    println!("Wrote {}", out.display());
}
