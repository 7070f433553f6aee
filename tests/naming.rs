use schemconv::naming::DerivedName;
use std::path::Path;

fn derive(name: &str) -> String {
    DerivedName::from_file_name(name).to_string()
}

#[test]
fn second_comma_segment_wins() {
    assert_eq!(derive("A,chip_top,B.eps"), "chip_top");
    assert_eq!(derive("lib,cell,schematic,1.ps"), "cell");
}

#[test]
fn fewer_than_two_commas_strips_extension() {
    assert_eq!(derive("mycircuit.eps"), "mycircuit");
    assert_eq!(derive("one,comma.eps"), "one,comma");
    assert_eq!(derive("noext"), "noext");
    assert_eq!(derive("multi.dot.eps"), "multi.dot");
}

#[test]
fn leading_dot_is_not_an_extension() {
    assert_eq!(derive(".hidden"), ".hidden");
    assert_eq!(derive(".hidden.eps"), ".hidden");
}

#[test]
fn empty_cell_segment_falls_back_to_stem() {
    assert_eq!(derive("A,,B.eps"), "A,,B");
}

#[test]
fn uses_file_name_component_of_path() {
    let n = DerivedName::from_path(Path::new("plots/A,top_metal,X.eps"));
    assert_eq!(n.as_str(), "top_metal");
    assert_eq!(
        n.pdf_path(Path::new("pdf")),
        Path::new("pdf").join("top_metal.pdf")
    );
}
