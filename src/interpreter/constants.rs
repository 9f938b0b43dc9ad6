// Constants for the interpreter

/// Largest list a fill constructor (`vector<int>(n, x)`) may build
pub const MAX_CONTAINER_SIZE: i64 = 10_000_000;

/// Message used for integer division by zero
pub const DIVISION_BY_ZERO: &str = "Division by zero";

/// Message used for integer modulo by zero
pub const MODULO_BY_ZERO: &str = "Modulo by zero";
