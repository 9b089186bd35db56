use alpaca_viewer::customize::{
    ColorSlot, ColorTable, hex_to_linear, hex_to_rgb8, linear_to_hex, rgb8_to_hex,
};

use crate::common::test_utils::RecordedColors;

mod common;

#[test]
fn should_start_with_the_default_colours() {
    let table = ColorTable::new();
    assert_eq!(table.options().len(), 8);
    for option in table.options() {
        assert_eq!(option.current_hex, option.default_hex);
        assert_eq!(option.default_hex, option.slot.default_hex());
    }
    assert_eq!(table.current(ColorSlot::Hooves), 0x46423c);
    assert_eq!(table.current(ColorSlot::EyeLight), 0xe0e0e0);
}

#[test]
fn should_bind_labels_to_sub_meshes_in_order() {
    let expected = [
        ("Color principal", "Cube"),
        ("Color claro", "Cube_1"),
        ("Color oscuro", "Cube_2"),
        ("Pezuñas", "Cube_3"),
        ("Cabello", "Cube_4"),
        ("Hocico", "Cube_5"),
        ("Ojo oscuro", "Cube_6"),
        ("Ojo claro", "Cube_7"),
    ];
    for (slot, (label, mesh)) in ColorSlot::ALL.into_iter().zip(expected) {
        assert_eq!(slot.label(), label);
        assert_eq!(slot.mesh_name(), mesh);
        assert_eq!(ColorSlot::from_label(label), Some(slot));
    }
    assert_eq!(ColorSlot::from_label("Cola"), None);
}

#[test]
fn should_write_every_label_through_to_its_sub_mesh() {
    let mut table = ColorTable::new();
    let mut meshes = RecordedColors::alpaca();
    for (i, slot) in ColorSlot::ALL.into_iter().enumerate() {
        let hex = 0x101010 * (i as u32 + 1);
        table.set_color(slot, hex, &mut meshes);
        assert_eq!(table.current(slot), hex);
        assert_eq!(meshes.color(slot.mesh_name()), Some(hex));
    }
    assert!(meshes.misses.is_empty());
}

#[test]
fn should_keep_the_colour_when_the_sub_mesh_is_missing() {
    let mut table = ColorTable::new();
    let mut meshes = RecordedColors::with_meshes(vec!["Cube".to_string()]);

    table.set_color(ColorSlot::Hair, 0xff0000, &mut meshes);

    assert_eq!(table.current(ColorSlot::Hair), 0xff0000);
    assert_eq!(meshes.color("Cube_4"), None);
    assert_eq!(meshes.misses, vec!["Cube_4".to_string()]);
}

#[test]
fn should_tolerate_a_model_that_is_not_loaded_yet() {
    let mut table = ColorTable::new();
    table.set_color(ColorSlot::Main, 0x123456, &mut ());
    assert_eq!(table.current(ColorSlot::Main), 0x123456);
}

#[test]
fn should_restore_all_defaults_after_any_mutations() {
    let mut table = ColorTable::new();
    let mut meshes = RecordedColors::alpaca();
    table.set_color(ColorSlot::Main, 0xff0000, &mut meshes);
    table.set_color(ColorSlot::Hooves, 0x00ff00, &mut meshes);
    table.set_color(ColorSlot::Hooves, 0x0000ff, &mut meshes);
    table.set_color(ColorSlot::EyeDark, 0xffffff, &mut meshes);

    table.reset_all(&mut meshes);

    assert_eq!(table, ColorTable::new());
    for slot in ColorSlot::ALL {
        assert_eq!(meshes.color(slot.mesh_name()), Some(slot.default_hex()));
    }
}

#[test]
fn should_ignore_bits_above_rgb() {
    let mut table = ColorTable::new();
    table.set_color(ColorSlot::Snout, 0xff_abcdef, &mut ());
    assert_eq!(table.current(ColorSlot::Snout), 0xabcdef);
}

#[test]
fn should_convert_between_srgb_hex_and_linear() {
    assert_eq!(hex_to_rgb8(0x46423c), [0x46, 0x42, 0x3c]);
    assert_eq!(rgb8_to_hex([0x46, 0x42, 0x3c]), 0x46423c);
    assert_eq!(hex_to_linear(0xffffff), [1.0, 1.0, 1.0]);
    assert_eq!(hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
    // mid grey is darker in linear space
    assert!(hex_to_linear(0x808080)[0] < 0.25);
    for slot in ColorSlot::ALL {
        let hex = slot.default_hex();
        assert_eq!(linear_to_hex(hex_to_linear(hex)), hex);
    }
}
