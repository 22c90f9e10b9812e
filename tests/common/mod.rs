use assert_cmd::Command;

pub fn deidgen_cmd() -> Command {
    let mut cmd = Command::cargo_bin("deidgen").unwrap();
    cmd.env_remove("OPENAI_API_KEY");
    cmd
}
