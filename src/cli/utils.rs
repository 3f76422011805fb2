use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a success message, merging `data` into the JSON form
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a failure in the requested format
pub fn output_error(output_format: OutputFormat, message: &str) {
    match output_format {
        OutputFormat::Json => {
            println!("{}", json!({ "success": false, "error": message }));
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
}
