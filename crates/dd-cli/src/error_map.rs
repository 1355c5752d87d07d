use dd_core::DaedalusError;
use std::fmt::Display;
use tracing::debug;

fn map_error(code: &'static str, error: impl Display) -> DaedalusError {
    DaedalusError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: DaedalusError) -> i32 {
    debug!(stage = ?error.stage(), code = %error.code, "command failed");
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    if let Some(location) = error.location() {
        println!("ERROR_AT:{}", location);
    }
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"\"".to_string())
    );
    1
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> DaedalusError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_scan(error: walkdir::Error) -> DaedalusError {
    map_error("CLI_SOURCE_SCAN", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> DaedalusError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_output_write(error: std::io::Error) -> DaedalusError {
    map_error("CLI_OUTPUT_WRITE", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(DaedalusError::new("ERR", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(
            map_cli_source_path(std::io::Error::other("path")).code,
            "CLI_SOURCE_PATH"
        );
        assert_eq!(
            map_cli_source_read(std::io::Error::other("read")).code,
            "CLI_SOURCE_READ"
        );
        assert_eq!(
            map_cli_output_write(std::io::Error::other("write")).code,
            "CLI_OUTPUT_WRITE"
        );

        let missing = std::env::temp_dir().join("dd-cli-error-map-missing-root");
        let scan_error = walkdir::WalkDir::new(&missing)
            .into_iter()
            .find_map(Result::err)
            .expect("missing root should fail to scan");
        assert_eq!(map_cli_source_scan(scan_error).code, "CLI_SOURCE_SCAN");
    }
}
