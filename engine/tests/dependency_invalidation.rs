use engine::{Position, Sheet, Value};

#[test]
fn editing_a_precedent_recomputes_its_dependent() {
    let mut sheet = Sheet::new();
    let a1 = Position::parse("A1").unwrap();
    let b1 = Position::parse("B1").unwrap();

    sheet.set_cell(a1, "=B1+1").unwrap();
    sheet.set_cell(b1, "5").unwrap();
    assert_eq!(sheet.get_cell(a1).unwrap(), Some(Value::Number(6.0)));

    sheet.set_cell(b1, "10").unwrap();
    assert_eq!(sheet.get_cell(a1).unwrap(), Some(Value::Number(11.0)));
}

#[test]
fn edge_symmetry_holds_after_a_chain_of_edits() {
    let mut sheet = Sheet::new();
    let a1 = Position::parse("A1").unwrap();
    let a2 = Position::parse("A2").unwrap();
    let a3 = Position::parse("A3").unwrap();

    sheet.set_cell(a1, "1").unwrap();
    sheet.set_cell(a2, "=A1+1").unwrap();
    sheet.set_cell(a3, "=A2+1").unwrap();
    assert_eq!(sheet.get_cell(a3).unwrap(), Some(Value::Number(3.0)));

    // Re-pointing A2 away from A1 must also retire the A1->A2 edge, not
    // just add the new one.
    sheet.set_cell(a2, "100").unwrap();
    assert_eq!(sheet.get_cell(a3).unwrap(), Some(Value::Number(101.0)));
    sheet.set_cell(a1, "999").unwrap();
    // A3 no longer depends on A1 transitively, so this edit must not
    // change it.
    assert_eq!(sheet.get_cell(a3).unwrap(), Some(Value::Number(101.0)));
}
