use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::tempdir;

fn columncrypt_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_columncrypt"))
}

fn run(args: &[&str]) -> Result<Output, Box<dyn Error>> {
    Ok(columncrypt_command().args(args).output()?)
}

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(ext);
    PathBuf::from(os)
}

fn fields(text: &str, line: usize) -> Vec<String> {
    text.lines()
        .nth(line)
        .unwrap_or_default()
        .split(':')
        .map(str::to_string)
        .collect()
}

#[test]
fn encrypt_then_decrypt_roundtrip() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.txt");
    fs::write(&input, "a:b:c\n1:2:3\n")?;

    let encrypt = run(&[
        "--file",
        input.to_str().unwrap(),
        "--column",
        "1",
        "--key",
        &fixture("public.pem"),
    ])?;
    assert!(
        encrypt.status.success(),
        "encrypt failed: {}",
        String::from_utf8_lossy(&encrypt.stderr)
    );
    let stdout = String::from_utf8(encrypt.stdout)?;
    assert!(stdout.contains("Data will be hashed and encrypted"));
    assert!(stdout.contains("Column 1: hashed, encrypted into 1_enc (2 ok, 0 failed)"));

    let encrypted_path = with_extension(&input, ".encrypted");
    let encrypted = fs::read_to_string(&encrypted_path)?;
    let row = fields(&encrypted, 1);
    assert_eq!(row.len(), 4);
    assert_eq!(row[0], "1");
    assert_eq!(
        row[1],
        "d4735e3a265e16eee03f59718b9b5d03019c07d8b6c51f90da3a666eec13ab35"
    );
    assert_eq!(row[2], "3");

    let decrypt = run(&[
        "-f",
        encrypted_path.to_str().unwrap(),
        "-c",
        "3",
        "-k",
        &fixture("private.pem"),
        "-o",
        "decrypt",
    ])?;
    assert!(
        decrypt.status.success(),
        "decrypt failed: {}",
        String::from_utf8_lossy(&decrypt.stderr)
    );
    assert!(String::from_utf8(decrypt.stdout)?.contains("Data will be decrypted"));

    let decrypted = fs::read_to_string(with_extension(&encrypted_path, ".decrypted"))?;
    assert_eq!(fields(&decrypted, 0)[3], "b");
    assert_eq!(fields(&decrypted, 1)[3], "2");
    Ok(())
}

#[test]
fn mismatched_private_key_completes_with_empty_cells() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.txt");
    fs::write(&input, "1:2:3\n")?;

    let encrypt = run(&[
        "-f",
        input.to_str().unwrap(),
        "-c",
        "1",
        "-k",
        &fixture("public.pem"),
    ])?;
    assert!(encrypt.status.success());
    let encrypted_path = with_extension(&input, ".encrypted");

    let decrypt = run(&[
        "-f",
        encrypted_path.to_str().unwrap(),
        "-c",
        "3",
        "-k",
        &fixture("other_private.pem"),
        "-o",
        "decrypt",
    ])?;
    assert!(
        decrypt.status.success(),
        "a wrong key is a value-level failure: {}",
        String::from_utf8_lossy(&decrypt.stderr)
    );
    let stderr = String::from_utf8_lossy(&decrypt.stderr);
    assert!(stderr.contains("Value-level failure"), "stderr: {}", stderr);
    assert!(String::from_utf8(decrypt.stdout)?.contains("1 cell(s) could not be processed"));

    let decrypted = fs::read_to_string(with_extension(&encrypted_path, ".decrypted"))?;
    let row = fields(&decrypted, 0);
    assert_eq!(row.len(), 4);
    assert_eq!(row[3], "");
    Ok(())
}

#[test]
fn wrong_key_type_aborts_without_output() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.txt");
    fs::write(&input, "1:2:3\n")?;

    let output = run(&[
        "-f",
        input.to_str().unwrap(),
        "-c",
        "0",
        "-k",
        &fixture("private.pem"),
    ])?;
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expecting public key"), "stderr: {}", stderr);
    assert!(!with_extension(&input, ".encrypted").exists());
    Ok(())
}

#[test]
fn invalid_column_is_a_configuration_error() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.txt");
    fs::write(&input, "1:2:3\n")?;

    let output = run(&[
        "-f",
        input.to_str().unwrap(),
        "-c",
        "0",
        "7",
        "-k",
        &fixture("public.pem"),
    ])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid column 7"));
    assert!(!with_extension(&input, ".encrypted").exists());
    Ok(())
}

#[test]
fn missing_required_arguments_print_usage() -> Result<(), Box<dyn Error>> {
    let output = run(&["--file", "whatever.txt"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: columncrypt"));
    Ok(())
}

#[test]
fn version_flag_prints_build_information() -> Result<(), Box<dyn Error>> {
    let output = run(&["--version"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("columncrypt "), "unexpected: {}", stdout);
    assert!(stdout.contains("build"));
    Ok(())
}

#[test]
fn repeated_column_flags_are_flattened() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.csv");
    fs::write(&input, "x,y,z\n")?;

    let output = run(&[
        "-f",
        input.to_str().unwrap(),
        "-d",
        ",",
        "-c",
        "0",
        "-c",
        "2",
        "0",
        "-k",
        &fixture("public.pem"),
    ])?;
    assert!(
        output.status.success(),
        "encrypt failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // output is ':'-delimited regardless of the input delimiter
    let encrypted = fs::read_to_string(with_extension(&input, ".encrypted"))?;
    let row = fields(&encrypted, 0);
    assert_eq!(row.len(), 5);
    assert_eq!(row[1], "y");
    assert_eq!(row[0].len(), 64);
    assert_eq!(row[2].len(), 64);
    Ok(())
}

#[test]
fn header_row_is_kept_with_new_labels() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("people.csv");
    let output_path = dir.path().join("people.protected");
    fs::write(&input, "name,email\nann,ann@example.com\nbo,bo@example.com\n")?;

    let output = run(&[
        "-f",
        input.to_str().unwrap(),
        "-d",
        ",",
        "--output-delimiter",
        ",",
        "--header",
        "1",
        "-c",
        "1",
        "-k",
        &fixture("public.pem"),
        "--output",
        output_path.to_str().unwrap(),
        "--oaep-hash",
        "sha256",
    ])?;
    assert!(
        output.status.success(),
        "encrypt failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = fs::read_to_string(&output_path)?;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("name,email,email_enc"));
    assert_eq!(lines.count(), 2);
    assert!(!with_extension(&input, ".encrypted").exists());
    Ok(())
}
