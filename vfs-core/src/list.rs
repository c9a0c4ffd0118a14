//! `ls` rendering: entries sorted by name (byte-wise), `.`/`..` included,
//! since swap-with-last compaction means storage order is never stable.

use vfs_image::Image;

use crate::dir;
use crate::entry::{Entry, Kind};

const MONTHS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Set", "Oct", "Nov", "Dec",
];

pub fn sorted_entries(image: &Image, head: u32) -> Vec<Entry> {
    let mut entries = dir::enumerate(image, head);
    entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
    entries
}

pub fn format_line(entry: &Entry) -> String {
    let month = MONTHS[(entry.date.month.saturating_sub(1).min(11)) as usize];
    let year = 1900 + entry.date.year as u32;
    let detail = match entry.kind {
        Kind::Dir => "DIR".to_string(),
        Kind::File => entry.size.to_string(),
    };
    format!("{}, {}-{}-{}, {}", entry.name, entry.date.day, month, year, detail)
}

pub fn render(image: &Image, head: u32) -> Vec<String> {
    sorted_entries(image, head).iter().map(format_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Date, Entry, Kind};
    use vfs_image::{BlockSize, FatType};

    #[test]
    fn format_line_renders_dir_as_dir_and_file_as_its_size() {
        let mut d = Entry::new_dir("b", 1);
        d.date = Date { day: 5, month: 9, year: 126 };
        assert_eq!(format_line(&d), "b, 5-Set-2026, DIR");

        let f = Entry::new_file("report.txt", 2, 4096);
        let mut f = f;
        f.date = Date { day: 1, month: 1, year: 0 };
        assert_eq!(format_line(&f), "report.txt, 1-Jan-1900, 4096");
    }

    #[test]
    fn render_sorts_entries_byte_wise_and_includes_dot_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut image = vfs_image::Image::open_or_format(&dir.path().join("disk.vfs"), BlockSize::B512, FatType::Fat8).unwrap();
        crate::dir::insert(&mut image, 0, &Entry::new_dir("zeta", 1)).unwrap();
        crate::dir::insert(&mut image, 0, &Entry::new_dir("Alpha", 2)).unwrap();

        let names: Vec<String> = sorted_entries(&image, 0).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec![".", "..", "Alpha", "zeta"]);
        assert!(sorted_entries(&image, 0).iter().all(|e| e.kind == Kind::Dir));
    }
}
