/// Error code registry for catcorr
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 3000-3999: Storage errors
/// - 4000-4999: Execution errors
/// - 7000-7999: Validation errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_INVALID_JSON: u16 = 1003;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_INVALID_TOML: u16 = 1006;
    pub const CONFIG_UNSUPPORTED_FORMAT: u16 = 1007;
    pub const CONFIG_VALIDATION_FAILED: u16 = 1008;
    pub const CONFIG_SCHEMA_ERROR: u16 = 1010;

    // Storage errors (3000-3999)
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_PERMISSION_DENIED: u16 = 3002;
    pub const STORAGE_NOT_FOUND: u16 = 3004;
    pub const STORAGE_ALREADY_EXISTS: u16 = 3005;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_SCHEMA_MISMATCH: u16 = 4020;
    pub const EXEC_MALFORMED_PARTIAL: u16 = 4021;
    pub const EXEC_UNKNOWN_PAIR: u16 = 4022;
    pub const EXEC_COUNT_OVERFLOW: u16 = 4023;
    pub const EXEC_TASK_FAILED: u16 = 4024;

    // Validation errors (7000-7999)
    pub const VALIDATION_INVALID_INPUT: u16 = 7008;
    pub const VALIDATION_INVALID_DATA: u16 = 7009;
}
