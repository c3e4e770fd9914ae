// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_flat_checklist(items: usize) -> String {
    let mut content = String::from("# Checklist\n\n");
    for i in 0..items {
        let mark = if i % 3 == 0 { 'x' } else { ' ' };
        content.push_str(&format!("- [{mark}] Item {i}\n"));
    }
    content
}

#[allow(dead_code)]
pub fn generate_nested_checklist(peers: usize, children: usize) -> String {
    let mut content = String::from("# Project\n\n");
    for peer in 0..peers {
        let mark = if peer % 2 == 0 { 'x' } else { ' ' };
        content.push_str(&format!("- [{mark}] Task {peer}\n"));
        for child in 0..children {
            content.push_str(&format!("  - [ ] Step {peer}.{child}\n"));
            content.push_str(&format!("    Note for step {child}\n"));
        }
    }
    content
}

#[allow(dead_code)]
pub fn generate_sectioned_document(sections: usize, items: usize) -> String {
    let mut content = String::new();
    for section in 0..sections {
        content.push_str(&format!("## Section {section}\n\n"));
        content.push_str(&generate_flat_checklist(items));
        content.push('\n');
    }
    content
}
