use engine::{Position, Sheet};

#[test]
fn bounding_box_tracks_the_farthest_non_empty_cell_after_a_clear() {
    let mut sheet = Sheet::new();
    let a1 = Position::parse("A1").unwrap();
    let c3 = Position::parse("C3").unwrap();

    sheet.set_cell(a1, "x").unwrap();
    sheet.set_cell(c3, "y").unwrap();
    assert_eq!(sheet.printable_size(), Some((3, 3)));

    sheet.clear_cell(a1).unwrap();
    assert_eq!(sheet.printable_size(), Some((3, 3)));

    sheet.clear_cell(c3).unwrap();
    assert_eq!(sheet.printable_size(), None);
}

#[test]
fn print_values_renders_tab_and_newline_separated_rows() {
    let mut sheet = Sheet::new();
    sheet.set_cell(Position::parse("A1").unwrap(), "1").unwrap();
    sheet.set_cell(Position::parse("B1").unwrap(), "=A1+1").unwrap();
    sheet.set_cell(Position::parse("A2").unwrap(), "x").unwrap();

    assert_eq!(sheet.print_values(), "1\t2\nx\t\n");
}
