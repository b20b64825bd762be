use crate::{
    cli::actions::{connect, print_json, prompt::Prompter},
    config::AppConfig,
    features::auth::{Banner, Credentials, OnboardingWizard, PasswordRequirement, Role, Step},
    session::SessionRepository,
};
use anyhow::{bail, Result};
use secrecy::SecretString;
use serde_json::json;

const RESEND_KEYWORD: &str = "resend";

#[derive(Debug)]
pub enum Command {
    Login {
        role: Role,
        email: String,
        password: Option<SecretString>,
    },
    Verify {
        code: String,
    },
    ResendCode,
    ResetPassword {
        new_password: Option<SecretString>,
        confirm_password: Option<SecretString>,
    },
}

#[derive(Debug)]
pub struct Args {
    pub config: AppConfig,
    pub command: Command,
}

/// Execute an onboarding command.
/// # Errors
/// Returns an error if a step is rejected or the session cannot be used.
pub async fn execute(args: Args) -> Result<()> {
    let (client, sessions) = connect(&args.config)?;
    let policy = args.config.gate_policy;
    let mut prompter = Prompter::new();

    match args.command {
        Command::Login {
            role,
            email,
            password,
        } => {
            let password = prompter.secret_or(password, "Password: ").await?;
            let mut wizard = OnboardingWizard::new(client, sessions, policy);
            wizard
                .submit_credentials(role, &Credentials::new(email, password))
                .await;
            drive(&mut wizard, &mut prompter).await?;
        }
        Command::Verify { code } => {
            let mut wizard = OnboardingWizard::resume(client, sessions, policy)?;
            wizard.submit_verification_code(&code).await;
            finish(&wizard)?;
        }
        Command::ResendCode => {
            let mut wizard = OnboardingWizard::resume(client, sessions, policy)?;
            match wizard.resend_code().await {
                Banner::Success(message) => print_json(&json!({ "message": message }))?,
                Banner::Error(message) => bail!(message),
            }
        }
        Command::ResetPassword {
            new_password,
            confirm_password,
        } => {
            let mut wizard = OnboardingWizard::resume(client, sessions, policy)?;
            let new_password = prompter.secret_or(new_password, "New password: ").await?;
            let confirm_password = prompter
                .secret_or(confirm_password, "Confirm new password: ")
                .await?;
            wizard
                .submit_password_reset(&new_password, &confirm_password)
                .await;
            finish(&wizard)?;
        }
    }

    Ok(())
}

/// Runs the remaining onboarding steps interactively until the dashboard is reached.
async fn drive<R: SessionRepository>(
    wizard: &mut OnboardingWizard<R>,
    prompter: &mut Prompter,
) -> Result<()> {
    loop {
        notify(wizard.banner());

        match wizard.step().clone() {
            Step::Complete { .. } => return finish(wizard),
            Step::Failed { message } => bail!(message),
            Step::NeedsEmailVerification { .. } => {
                let answer = prompter
                    .line("Verification code (or \"resend\"): ")
                    .await?;
                if answer.trim().eq_ignore_ascii_case(RESEND_KEYWORD) {
                    wizard.resend_code().await;
                } else {
                    wizard.submit_verification_code(&answer).await;
                }
            }
            Step::NeedsPasswordReset { .. } => {
                eprintln!("Your new password needs:");
                for requirement in PasswordRequirement::ALL {
                    eprintln!("  - {}", requirement.label());
                }
                let new_password = prompter.secret("New password: ").await?;
                let confirm_password = prompter.secret("Confirm new password: ").await?;
                wizard
                    .submit_password_reset(&new_password, &confirm_password)
                    .await;
            }
            step @ (Step::Credentials | Step::Authenticating { .. }) => {
                bail!("onboarding stopped in step {}", step.name())
            }
        }
    }
}

fn notify(banner: Option<&Banner>) {
    match banner {
        Some(Banner::Success(message)) => eprintln!("{message}"),
        Some(Banner::Error(message)) => eprintln!("error: {message}"),
        None => {}
    }
}

/// Prints where the flow stands, failing if the last submission was refused.
fn finish<R: SessionRepository>(wizard: &OnboardingWizard<R>) -> Result<()> {
    if let Some(Banner::Error(message)) = wizard.banner() {
        bail!(message.clone());
    }

    let user = wizard.sessions().get()?.map(|session| session.user);
    print_json(&json!({
        "step": wizard.step().name(),
        "redirect": wizard.redirect(),
        "message": wizard.banner().map(Banner::message),
        "user": user,
    }))
}
