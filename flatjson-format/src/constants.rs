//! Constants and marker characters for the FlatJSON line format

/// Format version tag written to the `FV` header field.
pub const FORMAT_VERSION: &str = "1.0";

/// Repeated at the start of a body line, once per nesting level.
pub const DEPTH_MARKER: char = ':';
/// Introduces an inline scalar or empty-container JSON payload.
pub const VALUE_SEPARATOR: char = '>';
/// Introduces the line count of a container's subtree.
pub const JUMP_MARKER_OPEN: char = '<';

/// Byte form of [`DEPTH_MARKER`].
pub const DEPTH_MARKER_BYTE: u8 = DEPTH_MARKER as u8;
/// Byte form of [`VALUE_SEPARATOR`].
pub const VALUE_SEPARATOR_BYTE: u8 = VALUE_SEPARATOR as u8;
/// Byte form of [`JUMP_MARKER_OPEN`].
pub const JUMP_MARKER_OPEN_BYTE: u8 = JUMP_MARKER_OPEN as u8;

/// Separates `KEY>VALUE` pairs on the header line.
pub const HEADER_FIELD_SEPARATOR: char = '|';
/// Separates a header key from its value.
pub const HEADER_KEY_SEPARATOR: char = '>';

/// Header key for the format version tag.
pub const HEADER_FORMAT_VERSION: &str = "FV";
/// Header key for the body hash algorithm.
pub const HEADER_HASH_ALGO: &str = "HASH_ALGO";
/// Header key for the hex-encoded body hash.
pub const HEADER_HASH: &str = "HASH";
/// Header key for the root container kind (`object` or `array`).
pub const HEADER_ROOT: &str = "ROOT";
/// Header key for the number of body lines.
pub const HEADER_LINES: &str = "LINES";

/// Path segment separator.
pub const PATH_SEPARATOR: char = '/';
/// Path escape character; escapes itself and [`PATH_SEPARATOR`].
pub const PATH_ESCAPE: char = '\\';

/// Inline payload of an empty object.
pub const EMPTY_OBJECT: &str = "{}";
/// Inline payload of an empty array.
pub const EMPTY_ARRAY: &str = "[]";

/// Cache flag for `get_value` results.
pub const CACHE_VALUE: u8 = 1 << 0;
/// Cache flag for `has_path` results.
pub const CACHE_HAS_PATH: u8 = 1 << 1;
/// Cache flag for `get_size` results.
pub const CACHE_SIZE: u8 = 1 << 2;
/// Cache flag for `get_sub_paths` results.
pub const CACHE_SUB_PATHS: u8 = 1 << 3;
/// Cache flag for `get_keys` results.
pub const CACHE_KEYS: u8 = 1 << 4;
/// Every cache flag.
pub const CACHE_ALL: u8 = (1 << 5) - 1;
