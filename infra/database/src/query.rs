//! SQL clause assembly from serializable condition structs.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DatabaseError;

/// Condition keys dropped from the `WHERE` clause unless overridden.
pub const EXCLUDED_KEYS: [&str; 5] = ["limit", "page", "sort", "s_time", "e_time"];

/// A finished SQL statement with its positional parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    /// Wraps raw SQL and parameters, bypassing the builder.
    #[must_use]
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self { sql: sql.into(), params }
    }
}

/// Builds `SELECT`/`COUNT`/`DELETE`/`UPDATE` statements from a table name,
/// a serializable conditions struct and rendering hints.
///
/// Condition fields listed via [`Query::like`] render `"field" LIKE ?` with
/// the value wrapped in `%`; fields listed via [`Query::r#in`] render
/// `"field" IN (...)`; every remaining field renders an equality check.
/// Null and empty-string values are dropped, so a partially filled filter
/// struct can be passed as-is. When both `s_time` and `e_time` carry values
/// the statement gains a `"created_at" BETWEEN ? AND ?` range.
#[derive(Clone, Debug)]
#[must_use = "The query does nothing until one of the build methods is called."]
pub struct Query {
    table: String,
    conditions: Map<String, Value>,
    like: Vec<String>,
    within: Vec<String>,
    order: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
    page: Option<u32>,
    excluded: Vec<String>,
    invalid: Option<String>,
}

impl Query {
    /// Starts a query against `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: Map::new(),
            like: Vec::new(),
            within: Vec::new(),
            order: None,
            limit: None,
            offset: None,
            page: None,
            excluded: EXCLUDED_KEYS.iter().map(|&key| key.to_owned()).collect(),
            invalid: None,
        }
    }

    /// Sets the conditions from any serializable struct or map.
    ///
    /// Serialization failures surface from the build methods.
    pub fn conditions<T: Serialize>(mut self, conditions: &T) -> Self {
        match serde_json::to_value(conditions) {
            Ok(Value::Object(map)) => self.conditions = map,
            Ok(other) => {
                self.invalid = Some(format!("Conditions must serialize to an object, got {other}"));
            }
            Err(e) => self.invalid = Some(format!("Serializing conditions failed: {e}")),
        }
        self
    }

    /// Condition fields rendered as `"field" LIKE ?` with `%value%`.
    pub fn like<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.like.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Condition fields rendered as `"field" IN (...)` from array values.
    pub fn r#in<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.within.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Replaces the default excluded keys ([`EXCLUDED_KEYS`]).
    pub fn exclude<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Order clause, e.g. `"created_at DESC, id"`. Defaults to `id DESC`.
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Maximum number of rows.
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Explicit row offset; takes precedence over [`Query::page`]. Only
    /// rendered together with a limit.
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// 1-based page number; the offset becomes `(page - 1) * limit`.
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Builds `SELECT * FROM ... WHERE ... ORDER BY ... LIMIT/OFFSET`.
    ///
    /// # Errors
    /// [`DatabaseError::Validation`] for unserializable conditions or
    /// invalid identifiers.
    pub fn build_select(&self) -> Result<Statement, DatabaseError> {
        let (clause, params) = self.where_clause()?;
        let mut sql = format!("SELECT * FROM {}{clause}", quote_identifier(&self.table)?);
        sql.push_str(" ORDER BY ");
        sql.push_str(&self.order_clause()?);
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
            if let Some(offset) = self.resolved_offset() {
                sql.push_str(&format!(" OFFSET {offset}"));
            }
        }
        Ok(Statement { sql, params })
    }

    /// Builds `SELECT COUNT(*) FROM ... WHERE ...`.
    ///
    /// # Errors
    /// Same conditions as [`Query::build_select`].
    pub fn build_count(&self) -> Result<Statement, DatabaseError> {
        let (clause, params) = self.where_clause()?;
        let sql = format!("SELECT COUNT(*) FROM {}{clause}", quote_identifier(&self.table)?);
        Ok(Statement { sql, params })
    }

    /// Builds `DELETE FROM ... WHERE ...`.
    ///
    /// # Errors
    /// Same conditions as [`Query::build_select`].
    pub fn build_delete(&self) -> Result<Statement, DatabaseError> {
        let (clause, params) = self.where_clause()?;
        let sql = format!("DELETE FROM {}{clause}", quote_identifier(&self.table)?);
        Ok(Statement { sql, params })
    }

    /// Builds `UPDATE ... SET ... WHERE ...` from a serializable assignments
    /// struct. Assignment parameters come first, condition parameters after.
    ///
    /// # Errors
    /// [`DatabaseError::Validation`] when the assignments are empty or carry
    /// invalid identifiers, [`DatabaseError::Serde`] when they cannot be
    /// serialized.
    pub fn build_update<T: Serialize>(&self, assignments: &T) -> Result<Statement, DatabaseError> {
        let map = object_from(assignments)?;
        if map.is_empty() {
            return Err(DatabaseError::Validation {
                message: "No assignment columns".into(),
                context: None,
            });
        }
        let mut set_fragments = Vec::with_capacity(map.len());
        let mut params = Vec::with_capacity(map.len());
        for (field, value) in map {
            set_fragments.push(format!("{} = ?", quote_identifier(&field)?));
            params.push(value);
        }
        let (clause, condition_params) = self.where_clause()?;
        params.extend(condition_params);
        let sql = format!(
            "UPDATE {} SET {}{clause}",
            quote_identifier(&self.table)?,
            set_fragments.join(", ")
        );
        Ok(Statement { sql, params })
    }

    fn where_clause(&self) -> Result<(String, Vec<Value>), DatabaseError> {
        if let Some(message) = &self.invalid {
            return Err(DatabaseError::Validation {
                message: message.clone().into(),
                context: None,
            });
        }

        let mut conditions = self.conditions.clone();

        // Time range bounds are read before the exclusion pass removes them.
        let s_time = non_empty_string(conditions.get("s_time"));
        let e_time = non_empty_string(conditions.get("e_time"));

        for key in &self.excluded {
            conditions.remove(key);
        }

        let mut fragments: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        for field in &self.like {
            let Some(value) = take_present(&mut conditions, field) else { continue };
            fragments.push(format!("{} LIKE ?", quote_identifier(field)?));
            params.push(Value::String(format!("%{}%", render_scalar(&value))));
        }

        for field in &self.within {
            let Some(value) = take_present(&mut conditions, field) else { continue };
            let items = match value {
                Value::Array(items) => items,
                single => vec![single],
            };
            if items.is_empty() {
                continue;
            }
            let placeholders = vec!["?"; items.len()].join(", ");
            fragments.push(format!("{} IN ({placeholders})", quote_identifier(field)?));
            params.extend(items);
        }

        for (field, value) in &conditions {
            if is_absent(value) {
                continue;
            }
            fragments.push(format!("{} = ?", quote_identifier(field)?));
            params.push(value.clone());
        }

        if let (Some(start), Some(end)) = (s_time, e_time) {
            fragments.push("\"created_at\" BETWEEN ? AND ?".to_owned());
            params.push(Value::String(start));
            params.push(Value::String(end));
        }

        if fragments.is_empty() {
            Ok((String::new(), params))
        } else {
            Ok((format!(" WHERE {}", fragments.join(" AND ")), params))
        }
    }

    fn order_clause(&self) -> Result<String, DatabaseError> {
        let order = self.order.as_deref().unwrap_or("id DESC");
        let mut rendered = Vec::new();
        for term in order.split(',') {
            let mut tokens = term.split_whitespace();
            let Some(field) = tokens.next() else {
                return Err(DatabaseError::Validation {
                    message: format!("Empty order term in '{order}'").into(),
                    context: None,
                });
            };
            let quoted = quote_identifier(field)?;
            let direction = match tokens.next().map(|token| token.to_ascii_uppercase()) {
                None => String::new(),
                Some(direction) if direction == "ASC" || direction == "DESC" => {
                    format!(" {direction}")
                }
                Some(other) => {
                    return Err(DatabaseError::Validation {
                        message: format!("Invalid order direction '{other}'").into(),
                        context: None,
                    });
                }
            };
            if tokens.next().is_some() {
                return Err(DatabaseError::Validation {
                    message: format!("Invalid order term '{term}'").into(),
                    context: None,
                });
            }
            rendered.push(format!("{quoted}{direction}"));
        }
        Ok(rendered.join(", "))
    }

    fn resolved_offset(&self) -> Option<u32> {
        self.offset.or_else(|| match (self.page, self.limit) {
            (Some(page), Some(limit)) if page > 0 => Some((page - 1).saturating_mul(limit)),
            _ => None,
        })
    }
}

/// Serializes `value` and requires the result to be a JSON object.
pub(crate) fn object_from<T: Serialize>(value: &T) -> Result<Map<String, Value>, DatabaseError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::Validation {
            message: format!("Expected an object, got {other}").into(),
            context: None,
        }),
    }
}

pub(crate) fn build_insert(
    table: &str,
    row: &Map<String, Value>,
) -> Result<Statement, DatabaseError> {
    if row.is_empty() {
        return Err(DatabaseError::Validation {
            message: "No columns to insert".into(),
            context: None,
        });
    }
    let mut columns = Vec::with_capacity(row.len());
    let mut params = Vec::with_capacity(row.len());
    for (field, value) in row {
        columns.push(quote_identifier(field)?);
        params.push(value.clone());
    }
    let placeholders = vec!["?"; params.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders})",
        quote_identifier(table)?,
        columns.join(", ")
    );
    Ok(Statement { sql, params })
}

pub(crate) fn build_upsert(
    table: &str,
    row: &Map<String, Value>,
    key: &str,
    assign: &[&str],
) -> Result<Statement, DatabaseError> {
    let base = build_insert(table, row)?;
    let action = if assign.is_empty() {
        "NOTHING".to_owned()
    } else {
        let mut updates = Vec::with_capacity(assign.len());
        for column in assign {
            let quoted = quote_identifier(column)?;
            updates.push(format!("{quoted} = excluded.{quoted}"));
        }
        format!("UPDATE SET {}", updates.join(", "))
    };
    let sql = format!("{} ON CONFLICT({}) DO {action}", base.sql, quote_identifier(key)?);
    Ok(Statement { sql, params: base.params })
}

fn quote_identifier(name: &str) -> Result<String, DatabaseError> {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(format!("\"{name}\""))
    } else {
        Err(DatabaseError::Validation {
            message: format!("Invalid identifier '{name}'").into(),
            context: None,
        })
    }
}

fn take_present(conditions: &mut Map<String, Value>, field: &str) -> Option<Value> {
    let value = conditions.remove(field)?;
    if is_absent(&value) { None } else { Some(value) }
}

const fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
