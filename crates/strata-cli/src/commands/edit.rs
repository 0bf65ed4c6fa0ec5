use super::{json_pretty, EXIT_SUCCESS};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use strata_core::Engine;
use strata_schema::{Description, RequestContext};

pub fn run(
    engine: &Engine,
    ctx: &RequestContext,
    session: &str,
    file: &Path,
    objects: bool,
    json: bool,
) -> Result<u8, String> {
    let input = read_document(file)?;
    let draft = if objects {
        let current = engine
            .sessions()
            .get(session, ctx)
            .map_err(|e| e.to_string())?;
        let mut description = Description::new(current.description);
        description.set_objects(input);
        description.into_value()
    } else {
        input
    };

    let saved = engine
        .sessions()
        .update_description(session, draft, ctx)
        .map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&saved)?);
    } else {
        println!("updated draft of session {}", saved.id);
    }
    Ok(EXIT_SUCCESS)
}

fn read_document(file: &Path) -> Result<Value, String> {
    let content = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        buf
    } else {
        std::fs::read_to_string(file)
            .map_err(|e| format!("failed to read {}: {e}", file.display()))?
    };
    serde_json::from_str(&content).map_err(|e| format!("invalid JSON in {}: {e}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        std::fs::write(&path, r#"{"Objects": {"vm": 1}}"#).unwrap();
        assert_eq!(read_document(&path).unwrap()["Objects"]["vm"], 1);
    }

    #[test]
    fn rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_document(&path).unwrap_err().contains("invalid JSON"));
    }
}
