use std::fs;
use std::path::PathBuf;

use image::RgbImage;
use radigenius::chat::{list_image_names, load_rgb_image, menu_options};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("radigenius-images-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_menu_from_directory() {
    let dir = scratch_dir("menu");
    fs::write(dir.join("b.jpg"), b"").unwrap();
    fs::write(dir.join("a.jpg"), b"").unwrap();
    fs::create_dir(dir.join("thumbs")).unwrap();

    let names = list_image_names(&dir).unwrap();
    assert_eq!(menu_options(&names), "a\nb");
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = scratch_dir("missing").join("nope");
    assert!(list_image_names(&dir).is_err());
}

#[test]
fn test_load_converts_to_rgb() {
    let dir = scratch_dir("load");
    let path = dir.join("scan.png");
    image::GrayImage::new(5, 7).save(&path).unwrap();

    let image: RgbImage = load_rgb_image(&path).unwrap();
    assert_eq!(image.dimensions(), (5, 7));
}

#[test]
fn test_missing_image_is_an_error() {
    let dir = scratch_dir("absent");
    assert!(load_rgb_image(&dir.join("ghost.jpg")).is_err());
}
