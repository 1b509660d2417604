use anyhow::Result;

use crate::{CliTest, capture};

const HERO: &str = "export const Hero = () => <h1>Welcome to the store</h1>;\n";

#[test]
fn test_fix_dry_run_leaves_files_untouched() -> Result<()> {
    let test = CliTest::with_file("src/Hero.tsx", HERO)?;

    let out = capture(test.fix_command().output()?);
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert!(out.stdout.contains("- Welcome to the store"));
    assert!(out.stdout.contains("+ {t('app.hero.welcome_to_the_store."));
    assert!(out.stdout.contains("Would replace 1 candidate(s) in 1 file(s)."));
    assert_eq!(test.read_file("src/Hero.tsx")?, HERO);

    Ok(())
}

#[test]
fn test_fix_apply_rewrites_and_rescan_is_clean() -> Result<()> {
    let test = CliTest::with_file("src/Hero.tsx", HERO)?;

    let out = capture(test.fix_command().arg("--apply").output()?);
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert!(out.stdout.contains("Replaced 1 candidate(s) in 1 file(s)."));

    let content = test.read_file("src/Hero.tsx")?;
    assert!(
        content.starts_with("export const Hero = () => <h1>{t('app.hero.welcome_to_the_store."),
        "got:\n{}",
        content
    );
    assert!(content.ends_with("')}</h1>;\n"));

    let rescan = capture(test.scan_command().output()?);
    assert_eq!(rescan.code, Some(0), "stdout: {}", rescan.stdout);

    Ok(())
}

#[test]
fn test_fix_apply_merges_interpolation() -> Result<()> {
    let test = CliTest::with_file(
        "src/Inbox.tsx",
        "export const Inbox = () => <p>Hello {user.name}, you have {count} messages</p>;\n",
    )?;

    capture(test.fix_command().arg("--apply").output()?);

    let content = test.read_file("src/Inbox.tsx")?;
    assert!(content.contains("<p>{t('app.inbox."), "got:\n{}", content);
    assert!(content.contains("', { name: user.name, count })}</p>"), "got:\n{}", content);

    Ok(())
}

#[test]
fn test_fix_apply_vue_uses_template_syntax() -> Result<()> {
    let test = CliTest::with_file(
        "src/Card.vue",
        "<template>\n  <p title=\"Say hello\">Welcome aboard friend</p>\n</template>\n",
    )?;

    let out = capture(test.fix_command().arg("--apply").output()?);
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);

    let content = test.read_file("src/Card.vue")?;
    assert!(content.contains("<p :title=\"$t('app.card_title.say_hello."), "got:\n{}", content);
    assert!(content.contains("\">{{ $t('app.card.welcome_aboard_friend."), "got:\n{}", content);

    Ok(())
}

#[test]
fn test_fix_without_pending_candidates() -> Result<()> {
    let test = CliTest::with_file("src/Empty.tsx", "export const Empty = () => null;\n")?;

    let out = capture(test.fix_command().output()?);
    assert_eq!(out.code, Some(0));
    assert!(out.stdout.contains("no hardcoded text found"));

    Ok(())
}
