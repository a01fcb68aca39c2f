use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn preview() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_mirror-preview"));
    command.env_remove("MIRROR_FILTER_DATA_DIR").env("RUST_LOG", "warn");
    command
}

#[test]
fn defaults_prints_switch_off() {
    let output = preview()
        .arg("defaults")
        .output()
        .expect("failed to run mirror-preview defaults");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, serde_json::json!({ "SwitchLeftToRight": false }));
}

#[test]
fn properties_uses_bundled_locale() {
    let output = preview()
        .arg("properties")
        .output()
        .expect("failed to run mirror-preview properties");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["id"], "gbihf_filter");
    assert_eq!(value["name"], "Mirror");
    assert_eq!(
        value["properties"],
        serde_json::json!([{
            "name": "SwitchLeftToRight",
            "description": "Switch Left To Right",
            "kind": "bool",
        }])
    );
}

#[test]
fn properties_reads_locale_from_data_dir() {
    let root = TempDir::new().unwrap();
    let locale_dir = root.path().join("locale");
    fs::create_dir_all(&locale_dir).unwrap();
    fs::write(
        locale_dir.join("en-US.ini"),
        "GBIHFFilter=\"Mirror\"\nSwitchLeftToRight=\"Switch Left To Right\"\n",
    )
    .unwrap();
    fs::write(
        locale_dir.join("de-DE.ini"),
        "GBIHFFilter=\"Spiegeln\"\nSwitchLeftToRight=\"Links und rechts tauschen\"\n",
    )
    .unwrap();

    let output = preview()
        .env("MIRROR_FILTER_DATA_DIR", root.path())
        .args(["properties", "--locale", "de-DE"])
        .output()
        .expect("failed to run mirror-preview properties");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "Spiegeln");
    assert_eq!(
        value["properties"][0]["description"],
        "Links und rechts tauschen"
    );
}

#[test]
fn properties_fails_for_unknown_locale() {
    let status = preview()
        .args(["properties", "--locale", "xx-XX"])
        .status()
        .expect("failed to run mirror-preview properties");
    assert!(!status.success());
}

#[test]
fn render_rejects_settings_that_are_not_an_object() {
    let root = TempDir::new().unwrap();
    let settings = root.path().join("settings.json");
    fs::write(&settings, "[true]").unwrap();
    let output_path = root.path().join("out.png");

    let status = preview()
        .args(["render", "--input", "missing.png", "--output"])
        .arg(&output_path)
        .arg("--settings")
        .arg(&settings)
        .status()
        .expect("failed to run mirror-preview render");
    assert!(!status.success());
    assert!(!output_path.exists());
}

#[test]
fn render_fails_for_missing_input() {
    let root = TempDir::new().unwrap();
    let output_path = root.path().join("out.png");

    let status = preview()
        .args(["render", "--input"])
        .arg(root.path().join("absent.png"))
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("failed to run mirror-preview render");
    assert!(!status.success());
    assert!(!output_path.exists());
}

#[test]
fn render_writes_mirrored_png() {
    let gpu = renderer::GpuContext::headless(renderer::GpuOptions {
        allow_fallback: true,
        ..renderer::GpuOptions::default()
    });
    if let Err(err) = &gpu {
        eprintln!("skipping GPU test: {err:#}");
        return;
    }
    drop(gpu);

    let root = TempDir::new().unwrap();
    let input_path = root.path().join("in.png");
    let output_path = root.path().join("out.png");
    let mut input = image::RgbaImage::new(4, 1);
    let colors = [
        [255, 0, 0, 255],
        [0, 255, 0, 255],
        [255, 255, 255, 255],
        [0, 0, 255, 255],
    ];
    for (x, color) in colors.into_iter().enumerate() {
        input.put_pixel(x as u32, 0, image::Rgba(color));
    }
    input.save(&input_path).unwrap();

    let status = preview()
        .args(["render", "--switch-left-to-right", "true", "--input"])
        .arg(&input_path)
        .arg("--output")
        .arg(&output_path)
        .status()
        .expect("failed to run mirror-preview render");
    assert!(status.success());

    let output = image::open(&output_path).unwrap().to_rgba8();
    assert_eq!(output.dimensions(), (4, 1));
    let pixels: Vec<[u8; 4]> = output.pixels().map(|pixel| pixel.0).collect();
    let mut expected = colors.to_vec();
    expected.reverse();
    assert_eq!(pixels, expected);
}
