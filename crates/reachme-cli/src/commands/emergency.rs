use crate::commands::common::render_emergency_lines;

pub fn run_emergency() {
    for line in render_emergency_lines() {
        println!("{line}");
    }
}
