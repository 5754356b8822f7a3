use crate::query::sql::quote_ident;
use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", quote_ident(&schema.name));
    let mut columns = Vec::new();

    for col in &schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        columns.push(format!(
            "    {} {}{}",
            quote_ident(&col.name),
            col.col_type.sql_type(),
            null_constraint
        ));
    }

    if !schema.primary_key.is_empty() {
        let key: Vec<_> = schema.primary_key.iter().map(|c| quote_ident(c)).collect();
        columns.push(format!("    PRIMARY KEY ({})", key.join(", ")));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate the INSERT statement binding every column of a schema
pub fn generate_insert(schema: &TableSchema) -> String {
    let columns: Vec<_> = schema.column_names().map(quote_ident).collect();
    let placeholders: Vec<_> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(&schema.name),
        columns.join(", "),
        placeholders.join(", ")
    )
}
