//! Grid markup writer.
//!
//! The output is well-formed XML so the client can read it back with the
//! same parser. Attribute names come from [`grid_model::markup`].

use std::io;

use grid_format::NumberFormat;
use grid_model::markup::{
    ATTR_BLOCKED, ATTR_CODE, ATTR_ENDPOINT, ATTR_ERROR_MESSAGE, ATTR_EXCLUSIVE, ATTR_FORMAT,
    ATTR_INITIAL, ATTR_KIND, ATTR_MAX, ATTR_MIN, ATTR_NAME, ATTR_OPTION_LABEL, ATTR_OPTION_VALUE,
    ATTR_READONLY, ATTR_REQUIRED, ATTR_ROW_INDEX, ATTR_TITLE, ATTR_VALUE, ATTR_VARIANT,
    CATALOGUE_CLASS, GRID_CLASS, OPTIONS_CLASS, TRUE,
};
use grid_model::{Cell, CodeEntry, Column, FieldKind, LayoutVariant, Row, TableDescription};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

type XmlWriter = Writer<Vec<u8>>;

fn element<'a>(name: &'a str, class: Option<&'a str>) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    if let Some(class) = class {
        start.push_attribute(("class", class));
    }
    start
}

fn end(writer: &mut XmlWriter, name: &str) -> io::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))
}

fn text_element(writer: &mut XmlWriter, start: BytesStart<'_>, text: &str) -> io::Result<()> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, &name)
}

fn into_string(writer: XmlWriter) -> io::Result<String> {
    String::from_utf8(writer.into_inner())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// A complete HTML page holding one grid.
pub fn render_page(description: &TableDescription) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::DocType(BytesText::new("html")))?;
    writer.write_event(Event::Start(BytesStart::new("html")))?;
    writer.write_event(Event::Start(BytesStart::new("head")))?;
    let mut charset = BytesStart::new("meta");
    charset.push_attribute(("charset", "utf-8"));
    writer.write_event(Event::Empty(charset))?;
    text_element(&mut writer, BytesStart::new("title"), &description.name)?;
    end(&mut writer, "head")?;
    writer.write_event(Event::Start(BytesStart::new("body")))?;
    text_element(&mut writer, BytesStart::new("h1"), &description.name)?;
    write_grid(&mut writer, description)?;
    end(&mut writer, "body")?;
    end(&mut writer, "html")?;
    into_string(writer)
}

/// The grid element alone.
pub fn render_grid(description: &TableDescription) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_grid(&mut writer, description)?;
    into_string(writer)
}

/// One table row, as fetched when a dynamic row is added.
pub fn render_row_fragment(
    columns: &[Column],
    variant: LayoutVariant,
    row: &Row,
) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_row(&mut writer, columns, variant, row, 0)?;
    into_string(writer)
}

fn write_grid(writer: &mut XmlWriter, description: &TableDescription) -> io::Result<()> {
    let variant = description.variant;
    let mut root = element("div", Some(GRID_CLASS));
    root.push_attribute((ATTR_VARIANT, variant.as_str()));
    root.push_attribute((ATTR_ENDPOINT, description.endpoint.as_str()));
    root.push_attribute((ATTR_TITLE, description.name.as_str()));
    if variant.is_dynamic() && !description.data.trim().is_empty() {
        root.push_attribute((ATTR_INITIAL, description.data.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(element("table", Some("grid-table"))))?;
    write_header(writer, &description.columns, variant)?;
    writer.write_event(Event::Start(BytesStart::new("tbody")))?;
    for (position, row) in description.rows.iter().enumerate() {
        write_row(writer, &description.columns, variant, row, position as u64)?;
    }
    end(writer, "tbody")?;
    end(writer, "table")?;

    if variant.is_dynamic() {
        write_catalogue(writer, &description.catalogue)?;
    }
    end(writer, "div")
}

fn write_header(
    writer: &mut XmlWriter,
    columns: &[Column],
    variant: LayoutVariant,
) -> io::Result<()> {
    match variant {
        LayoutVariant::HorizontalStaticUnique
        | LayoutVariant::HorizontalDynamicUnique
        | LayoutVariant::HorizontalDynamicDuplicable => {
            writer.write_event(Event::Start(BytesStart::new("thead")))?;
            writer.write_event(Event::Start(BytesStart::new("tr")))?;
            for column in columns.iter().filter(|column| column.visible) {
                let mut th = BytesStart::new("th");
                if let Some(tooltip) = &column.tooltip {
                    th.push_attribute(("title", tooltip.as_str()));
                }
                text_element(writer, th, &column.title)?;
            }
            if variant.is_dynamic() {
                writer.write_event(Event::Empty(BytesStart::new("th")))?;
            }
            end(writer, "tr")?;
            end(writer, "thead")
        }
        LayoutVariant::VerticalStaticUnique | LayoutVariant::SystemDefinition => Ok(()),
    }
}

fn write_row(
    writer: &mut XmlWriter,
    columns: &[Column],
    variant: LayoutVariant,
    row: &Row,
    position: u64,
) -> io::Result<()> {
    let index = row.index.map_or(position, |index| index.0);
    let mut tr = BytesStart::new("tr");
    tr.push_attribute((ATTR_ROW_INDEX, index.to_string().as_str()));
    if let Some(code) = &row.code {
        tr.push_attribute((ATTR_CODE, code.as_str()));
    }
    if let Some(title) = &row.title {
        tr.push_attribute((ATTR_TITLE, title.as_str()));
    }
    writer.write_event(Event::Start(tr))?;

    if variant == LayoutVariant::VerticalStaticUnique {
        let title = row.title.as_deref().unwrap_or_default();
        text_element(writer, BytesStart::new("th"), title)?;
    }
    for cell in &row.cells {
        let Some(column) = columns.get(cell.column) else {
            continue;
        };
        if !column.visible {
            write_input(writer, column, cell, "hidden")?;
            if column.kind.has_options() {
                write_options(writer, column, true)?;
            }
            continue;
        }
        writer.write_event(Event::Start(BytesStart::new("td")))?;
        write_input(writer, column, cell, "text")?;
        if column.kind.has_options() {
            write_options(writer, column, false)?;
        }
        if !column.unit.is_empty() {
            text_element(writer, element("span", Some("unit")), &column.unit)?;
        }
        end(writer, "td")?;
    }
    if variant.is_dynamic() {
        writer.write_event(Event::Start(BytesStart::new("td")))?;
        let mut button = element("button", Some("delete-row"));
        button.push_attribute(("type", "button"));
        text_element(writer, button, "Usuń")?;
        end(writer, "td")?;
    }
    end(writer, "tr")
}

/// Value as shown in the input. Numbers use the column's display mask.
fn display_value(column: &Column, cell: &Cell) -> String {
    match column.kind {
        FieldKind::Number => NumberFormat::from_mask(&column.format)
            .reformat(&cell.value)
            .unwrap_or_else(|| cell.value.clone()),
        FieldKind::Text | FieldKind::Choice | FieldKind::MultiSelect | FieldKind::MultiExclusive => {
            cell.value.clone()
        }
    }
}

fn write_input(
    writer: &mut XmlWriter,
    column: &Column,
    cell: &Cell,
    input_type: &str,
) -> io::Result<()> {
    let mut input = BytesStart::new("input");
    input.push_attribute((ATTR_NAME, cell.name.as_str()));
    input.push_attribute(("type", input_type));
    input.push_attribute((ATTR_KIND, column.kind.as_str()));
    if cell.required {
        input.push_attribute((ATTR_REQUIRED, TRUE));
    }
    if !column.format.is_empty() {
        input.push_attribute((ATTR_FORMAT, column.format.as_str()));
    }
    if let Some(min) = column.min {
        input.push_attribute((ATTR_MIN, min.to_string().as_str()));
    }
    if let Some(max) = column.max {
        input.push_attribute((ATTR_MAX, max.to_string().as_str()));
    }
    if let Some(message) = &column.error_message {
        input.push_attribute((ATTR_ERROR_MESSAGE, message.as_str()));
    }
    if cell.blocked {
        input.push_attribute((ATTR_BLOCKED, TRUE));
        input.push_attribute(("disabled", "disabled"));
    }
    if !cell.editable {
        input.push_attribute((ATTR_READONLY, "readonly"));
    }
    if let Some(tooltip) = &column.tooltip {
        input.push_attribute(("title", tooltip.as_str()));
    }
    input.push_attribute((ATTR_VALUE, display_value(column, cell).as_str()));
    writer.write_event(Event::Empty(input))
}

/// Option list for an enum column. Hidden columns still carry it so their
/// stored value survives the round trip.
fn write_options(writer: &mut XmlWriter, column: &Column, hidden: bool) -> io::Result<()> {
    let mut list = element("ul", Some(OPTIONS_CLASS));
    if hidden {
        list.push_attribute(("hidden", "hidden"));
    }
    writer.write_event(Event::Start(list))?;
    for option in &column.options {
        let mut item = BytesStart::new("li");
        item.push_attribute((ATTR_OPTION_VALUE, option.value.as_str()));
        item.push_attribute((ATTR_OPTION_LABEL, option.label.as_str()));
        if option.exclusive {
            item.push_attribute((ATTR_EXCLUSIVE, TRUE));
        }
        text_element(writer, item, &option.search_text())?;
    }
    end(writer, "ul")
}

fn write_catalogue(writer: &mut XmlWriter, catalogue: &[CodeEntry]) -> io::Result<()> {
    writer.write_event(Event::Start(element("div", Some("add-row"))))?;
    let mut filter = element("input", Some("code-filter"));
    filter.push_attribute(("type", "text"));
    writer.write_event(Event::Empty(filter))?;
    writer.write_event(Event::Start(element("ul", Some(CATALOGUE_CLASS))))?;
    for entry in catalogue {
        let mut item = BytesStart::new("li");
        item.push_attribute((ATTR_CODE, entry.code.as_str()));
        item.push_attribute((ATTR_TITLE, entry.title.as_str()));
        text_element(writer, item, &format!("{} - {}", entry.code, entry.title))?;
    }
    end(writer, "ul")?;
    end(writer, "div")
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_model::{EnumOption, RowIndex};

    fn columns() -> Vec<Column> {
        vec![
            Column::new("Zwierzeta_Kod", FieldKind::Text).with_format("$"),
            Column::new("Zwierzeta_Sztuki", FieldKind::Number)
                .with_format("# ##0")
                .with_required(true)
                .with_bounds(Some(0.0), Some(100000.0)),
            Column::new("Zwierzeta_Rasa", FieldKind::Choice).with_options(vec![
                EnumOption::new("1", "Mleczna"),
                EnumOption::new("2", "Mi\"sna & co"),
            ]),
        ]
    }

    fn row() -> Row {
        let columns = columns();
        let mut cells: Vec<Cell> = columns
            .iter()
            .enumerate()
            .map(|(index, column)| Cell::for_column(index, column))
            .collect();
        cells[0].value = "10".into();
        cells[0].editable = false;
        cells[1].value = "1250".into();
        cells[2].blocked = true;
        Row {
            cells,
            title: Some("Bydło".into()),
            code: Some("10".into()),
            index: Some(RowIndex(3)),
        }
    }

    #[test]
    fn fragment_carries_the_field_contract() {
        let markup =
            render_row_fragment(&columns(), LayoutVariant::HorizontalDynamicUnique, &row()).unwrap();
        assert!(markup.contains(r#"<tr data-row-index="3" data-code="10" data-title="Bydło">"#));
        assert!(markup.contains(r#"name="Zwierzeta_Kod""#));
        assert!(markup.contains(r#"readonly="readonly""#));
        assert!(markup.contains(r#"data-min="0" data-max="100000""#));
        assert!(markup.contains(r#"value="1 250""#));
        assert!(markup.contains(r#"data-blocked="1""#));
        assert!(markup.contains("Mi&quot;sna &amp; co"));
        assert!(markup.contains("delete-row"));
    }

    #[test]
    fn static_grid_has_no_catalogue_or_initial_data() {
        let mut description = TableDescription::new(LayoutVariant::HorizontalStaticUnique);
        description.name = "A Uprawy".into();
        description.columns = columns();
        description.rows = vec![row()];
        description.data = "[]".into();
        let markup = render_grid(&description).unwrap();
        assert!(markup.contains(r#"data-variant="HORIZONTAL_STATIC_UNIQUE""#));
        assert!(!markup.contains("data-initial"));
        assert!(!markup.contains(CATALOGUE_CLASS));
        assert!(!markup.contains("delete-row"));
    }

    #[test]
    fn hidden_choice_value_survives_the_runtime_round_trip() {
        use grid_runtime::{Grid, ManualClock, RuntimeOptions, parse_grid};

        let mut hidden = Column::new("Rasy_Ukryte", FieldKind::Choice).with_options(vec![
            EnumOption::new("1", "Mleczna"),
            EnumOption::new("2", "Mięsna"),
        ]);
        hidden.visible = false;
        let columns = vec![
            Column::new("Rasy_Kod", FieldKind::Text).with_format("$"),
            hidden,
            Column::new("Rasy_Uwagi", FieldKind::Text).with_format("$"),
        ];
        let mut cells: Vec<Cell> = columns
            .iter()
            .enumerate()
            .map(|(index, column)| Cell::for_column(index, column))
            .collect();
        cells[0].value = "01".into();
        cells[0].editable = false;
        cells[1].value = "1".into();
        cells[2].value = "x".into();

        let mut description = TableDescription::new(LayoutVariant::HorizontalStaticUnique);
        description.name = "C Rasy".into();
        description.columns = columns;
        description.rows = vec![Row {
            cells,
            title: Some("Bydło".into()),
            code: Some("01".into()),
            index: Some(RowIndex(0)),
        }];
        description.data = "[]".into();

        let markup = render_grid(&description).unwrap();
        assert!(markup.contains(r#"type="hidden""#));
        assert!(markup.contains(r#"<ul class="options" hidden="hidden">"#));

        let mut grid = Grid::from_markup(
            parse_grid(&markup).unwrap(),
            RuntimeOptions::default(),
            Box::new(ManualClock::default()),
        )
        .unwrap();
        let ticket = grid.begin_save(None).unwrap();
        assert!(ticket.body.contains(r#""Rasy_Ukryte":"1""#));
        assert!(ticket.body.contains(r#""Rasy_Uwagi":"x""#));
    }
}
