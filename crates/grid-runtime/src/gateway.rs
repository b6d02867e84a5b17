//! Grid serialization and the save reply.

use grid_format::parse_number;
use grid_model::LayoutVariant;
use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::error::GatewayError;
use crate::field::{Capability, Field};
use crate::rows::{RowRecord, RowSet};
use crate::transport::Response;

/// Wire value of one field, or `None` when it is left out.
pub fn field_wire_value(field: &Field) -> Option<Value> {
    match field.capability {
        Capability::Number(_) => match parse_number(&field.text) {
            Ok(Some(value)) => number_value(value),
            _ => None,
        },
        Capability::Text(_) | Capability::ReadOnly => {
            let text = field.text.trim();
            (!text.is_empty()).then(|| Value::String(text.to_string()))
        }
        Capability::Choice | Capability::MultiSelect | Capability::MultiExclusive => {
            let value = field.value();
            (!value.is_empty()).then_some(Value::String(value))
        }
    }
}

fn number_value(value: f64) -> Option<Value> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(Value::from(value as i64))
    } else {
        Number::from_f64(value).map(Value::Number)
    }
}

/// Write the row's wire values into `object`. Returns false when no editable
/// field produced a value; such a row is not sent.
fn write_fields(row: &RowRecord, object: &mut Map<String, Value>) -> bool {
    let mut edited = false;
    for field in &row.fields {
        if let Some(value) = field_wire_value(field) {
            edited |= field.is_editable();
            object.insert(field.name().to_string(), value);
        }
    }
    edited
}

/// Serialize the rows for a save. `None` means there is nothing to send.
pub fn serialize(variant: LayoutVariant, rows: &RowSet) -> Option<Value> {
    match variant {
        LayoutVariant::VerticalStaticUnique => {
            let mut object = Map::new();
            let mut edited = false;
            for row in rows.iter().filter(|row| row.has_data()) {
                edited |= write_fields(row, &mut object);
            }
            edited.then_some(Value::Object(object))
        }
        LayoutVariant::HorizontalStaticUnique
        | LayoutVariant::HorizontalDynamicUnique
        | LayoutVariant::HorizontalDynamicDuplicable => {
            let array: Vec<Value> = rows
                .iter()
                .filter(|row| row.has_data())
                .filter_map(|row| {
                    let mut object = Map::new();
                    write_fields(row, &mut object).then_some(Value::Object(object))
                })
                .collect();
            (!array.is_empty()).then_some(Value::Array(array))
        }
        LayoutVariant::SystemDefinition => None,
    }
}

#[derive(Debug, Deserialize)]
struct SaveReply {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

fn reply_message(body: &str) -> Option<String> {
    serde_json::from_str::<SaveReply>(body)
        .ok()
        .and_then(|reply| reply.message)
}

/// Interpret the server's answer to a save.
pub fn check_save_reply(response: &Response) -> Result<(), GatewayError> {
    if !response.is_success() {
        return Err(GatewayError::Server {
            status: response.status,
            message: reply_message(&response.body),
        });
    }
    match serde_json::from_str::<SaveReply>(&response.body) {
        Ok(SaveReply { success: true, .. }) => Ok(()),
        Ok(SaveReply { message, .. }) => Err(GatewayError::Unconfirmed(
            message.unwrap_or_else(|| "success flag not set".to_string()),
        )),
        Err(err) => Err(GatewayError::Unconfirmed(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use grid_model::{EnumOption, FieldKind, RowIndex};
    use serde_json::json;

    fn row(index: u64, code: &str, count: &str, notes: &str) -> RowRecord {
        RowRecord::new(
            RowIndex(index),
            Some(code.to_string()),
            None,
            vec![
                Field::new(FieldSpec::new("Wartosc_Kod", FieldKind::Text).read_only(), code),
                Field::new(
                    FieldSpec::new("Wartosc_Liczba", FieldKind::Number).with_format("###0,00"),
                    count,
                ),
                Field::new(FieldSpec::new("Wartosc_Uwagi", FieldKind::Text), notes),
            ],
        )
    }

    #[test]
    fn horizontal_skips_rows_without_data() {
        let mut rows = RowSet::new();
        rows.push(row(0, "01", "12,5", ""));
        rows.push(row(1, "02", "", "   "));
        rows.push(row(2, "03", "", "uwaga"));

        let payload = serialize(LayoutVariant::HorizontalStaticUnique, &rows).unwrap();
        assert_eq!(
            payload,
            json!([
                {"Wartosc_Kod": "01", "Wartosc_Liczba": 12.5},
                {"Wartosc_Kod": "03", "Wartosc_Uwagi": "uwaga"},
            ])
        );
    }

    #[test]
    fn empty_grid_has_nothing_to_send() {
        let mut rows = RowSet::new();
        rows.push(row(0, "01", "", ""));
        assert!(serialize(LayoutVariant::HorizontalStaticUnique, &rows).is_none());
        assert!(serialize(LayoutVariant::VerticalStaticUnique, &rows).is_none());
    }

    #[test]
    fn uncommitted_choice_text_is_not_a_row() {
        let options = vec![EnumOption::new("1", "Mleczna"), EnumOption::new("2", "Mięsna")];
        let spec = FieldSpec::new("Wartosc_Rasa", FieldKind::Choice).with_options(options);
        let mut breed = Field::new(spec, "");
        breed.input("Mle");
        let mut typed = row(0, "01", "", "");
        typed.fields.push(breed);
        assert!(typed.has_data());

        let mut rows = RowSet::new();
        rows.push(typed);
        assert!(serialize(LayoutVariant::HorizontalStaticUnique, &rows).is_none());

        rows.push(row(1, "02", "3", ""));
        assert_eq!(
            serialize(LayoutVariant::HorizontalStaticUnique, &rows).unwrap(),
            json!([{"Wartosc_Kod": "02", "Wartosc_Liczba": 3}])
        );
    }

    #[test]
    fn vertical_is_one_flat_object() {
        let mut rows = RowSet::new();
        rows.push(RowRecord::new(
            RowIndex(0),
            None,
            Some("1. Powierzchnia".into()),
            vec![Field::new(
                FieldSpec::new("Powierzchnia", FieldKind::Number).with_format("# ##0,00"),
                "1 500",
            )],
        ));
        rows.push(RowRecord::new(
            RowIndex(1),
            None,
            None,
            vec![Field::new(FieldSpec::new("Uwagi", FieldKind::Text), " brak ")],
        ));
        let payload = serialize(LayoutVariant::VerticalStaticUnique, &rows).unwrap();
        assert_eq!(payload, json!({"Powierzchnia": 1500, "Uwagi": "brak"}));
    }

    #[test]
    fn save_reply_needs_success_flag() {
        assert!(check_save_reply(&Response::new(200, r#"{"success":true}"#)).is_ok());
        assert!(matches!(
            check_save_reply(&Response::new(200, r#"{"success":false,"message":"no"}"#)),
            Err(GatewayError::Unconfirmed(message)) if message == "no"
        ));
        assert!(matches!(
            check_save_reply(&Response::new(500, r#"{"success":false,"message":"disk"}"#)),
            Err(GatewayError::Server { status: 500, message: Some(_) })
        ));
        assert!(matches!(
            check_save_reply(&Response::new(502, "Bad gateway")),
            Err(GatewayError::Server { status: 502, message: None })
        ));
    }
}
