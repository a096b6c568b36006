use schemars::schema_for;
use trbx_generate::GenerateOptions;

fn main() {
    let schema = schema_for!(GenerateOptions);
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
