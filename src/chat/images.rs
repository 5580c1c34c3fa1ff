use std::fs;
use std::io;
use std::path::Path;
use image::{ImageResult, RgbImage};

/// Menu names for a set of file names.
///
/// A name is everything before the first `.`. Names that come out empty
/// (dot files) are skipped and the rest are sorted.
pub fn image_names<I, S>(file_names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names: Vec<String> = file_names
        .into_iter()
        .filter_map(|f| {
            let name = f.as_ref().split('.').next().unwrap_or_default();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect();
    names.sort();
    names
}

/// Menu names for the files in `dir`.
pub fn list_image_names(dir: &Path) -> io::Result<Vec<String>> {
    let file_names: Vec<String> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    Ok(image_names(file_names))
}

/// Menu text, one name per line.
pub fn menu_options(names: &[String]) -> String {
    names.join("\n")
}

/// Opens an image and converts it to 8-bit RGB.
pub fn load_rgb_image(path: &Path) -> ImageResult<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_from_file_names() {
        let names = image_names(["a.jpg", "b.jpg"]);
        assert_eq!(menu_options(&names), "a\nb");
    }

    #[test]
    fn test_name_stops_at_first_dot() {
        assert_eq!(image_names(["chest.v2.jpg", "knee.png"]), vec!["chest", "knee"]);
    }

    #[test]
    fn test_names_are_sorted_and_dot_files_skipped() {
        assert_eq!(image_names(["b.jpg", ".DS_Store", "a.jpg"]), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_menu() {
        assert_eq!(menu_options(&image_names(Vec::<String>::new())), "");
    }
}
