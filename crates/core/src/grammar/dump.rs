use super::ast::SourceFile;

/// Serialize a parsed source file to a pretty-printed JSON string.
pub fn to_pretty_json(file: &SourceFile) -> String {
    serde_json::to_string_pretty(file).expect("SourceFile serialization cannot fail")
}
