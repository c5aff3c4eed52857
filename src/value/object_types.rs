//! The closed `OBJSTART` object-type table: a single leading byte (`0..=28`) naming the kind of
//! object being started (`spec.md` §4.1).

const NAMED: &[(&str, u8)] = &[
    ("ind_group", 0),
    ("ind_window", 1),
    ("ind_button", 2),
    ("ind_text", 3),
    ("ind_list", 4),
    ("ind_menu", 5),
    ("ind_menu_item", 6),
    ("ind_checkbox", 7),
    ("ind_radio", 8),
    ("ind_slider", 9),
    ("ind_progress", 10),
    ("ind_tab", 11),
    ("ind_tab_page", 12),
    ("ind_scroll", 13),
    ("ind_image", 14),
    ("ind_separator", 15),
    ("ind_grid", 16),
    ("ind_grid_cell", 17),
    ("ind_tree", 18),
    ("ind_tree_item", 19),
    ("ind_dialog", 20),
    ("ind_toolbar", 21),
    ("ind_status_bar", 22),
    ("ind_tooltip", 23),
    ("ind_spinner", 24),
    ("ind_combo", 25),
    ("ind_edit", 26),
    ("ind_label", 27),
    ("ind_panel", 28),
];

pub fn name_of(byte: u8) -> Option<&'static str> {
    NAMED.iter().find(|&&(_, code)| code == byte).map(|&(name, _)| name)
}

pub fn byte_of(name: &str) -> Option<u8> {
    NAMED.iter().find(|&&(n, _)| n == name).map(|&(_, code)| code)
}
