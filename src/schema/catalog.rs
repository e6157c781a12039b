//! Catalog statements issued against the engine's system views.
//!
//! Both take `@ProcedureName`; the table-type query also takes
//! `@PropertyName` (the parameter name without `@`).

/// Statement parameter carrying the procedure name
pub const PROCEDURE_NAME_PARAM: &str = "ProcedureName";

/// Statement parameter carrying the formal parameter name
pub const PROPERTY_NAME_PARAM: &str = "PropertyName";

/// Column names of the table type behind a procedure parameter, in column order
pub const TABLE_TYPE_COLUMNS: &str = "SELECT c.name FROM sys.parameters a \
JOIN sys.table_types b ON a.user_type_id = b.user_type_id \
JOIN sys.columns c ON c.object_id = b.type_table_object_id \
WHERE a.object_id = object_id(@ProcedureName) AND a.name = N'@' + @PropertyName \
ORDER BY c.column_id";

/// Declared parameter names of a procedure, without the `@` prefix
pub const PROCEDURE_PARAMETERS: &str =
    "SELECT REPLACE(name,N'@',N'') FROM sys.parameters WHERE object_id = object_id(@ProcedureName);";
