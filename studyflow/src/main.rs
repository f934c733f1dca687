//! studyflow - AI study assistant client
//!
//! A CLI client for the study backend: subjects and syllabus analysis,
//! concept explanations, quizzes with AI reports, and study plans.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]

mod cli;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use cli::{
    AccountCommands, Cli, Commands, ExamCommands, PlanCommands, QuizCommands, ReportFormat,
    SubjectCommands, WeekCommands,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use studyflow::api::{
    ApiClient, ApiError, ConceptMode, ConceptRequest, ExamDateRequest, OnboardingProfile,
    Preferences, ProfileUpdate, QuizOptions, Subject, Upload,
};
use studyflow::config::ClientConfig;
use studyflow::html_exporter::{render_html, to_html};
use studyflow::markdown_exporter::{render_markdown, to_markdown};
use studyflow::navigation::{App, Location, MemoryNavigator};
use studyflow::optimistic;
use studyflow::polling::{self, AnalysisState};
use studyflow::progress::{ConceptProgress, StagedProgress, CONCEPT_TICK, STAGED_TICK};
use studyflow::quiz::{format_week_scope, QuizSession};
use studyflow::report::{parse_report, ReportMeta};
use studyflow::router::{transition, QuizMode, Screen, ScreenEvent};
use studyflow::schedule;
use studyflow::storage::{keys, FileStore, KeyValueStore};
use studyflow::validation::{self, SignUpForm};
use studyflow::{concept, session};

/// Main entry point for the studyflow CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }

    let config = ClientConfig::resolve(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;
    log::info!("Using backend {}", config.backend_url);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let mut client = Client::open(config)?;

    match cli.command {
        Commands::Report {
            input,
            quiz,
            output,
            format,
            title,
        } => {
            let source = match (input, quiz) {
                (Some(path), _) => ReportSource::File(path),
                (None, Some(quiz_id)) => ReportSource::Quiz(quiz_id),
                (None, None) => bail!("Give a report file or --quiz <ID>"),
            };
            runtime.block_on(handle_report_command(&client, source, output, format, title))?;
        }

        Commands::Route { url } => {
            handle_route_command(client.store, &url)?;
        }

        Commands::Login { login_id, password } => {
            runtime.block_on(handle_login_command(&mut client, &login_id, &password))?;
        }

        Commands::Logout => {
            handle_logout_command(&mut client)?;
        }

        Commands::Signup {
            login_id,
            password,
            password_confirm,
            username,
            school,
            major,
            grade,
        } => {
            let form = SignUpForm {
                login_id,
                password,
                password_confirm,
                username,
                school,
                major,
                grade,
            };
            runtime.block_on(handle_signup_command(&mut client, &form))?;
        }

        Commands::Whoami => {
            runtime.block_on(handle_whoami_command(&mut client))?;
        }

        Commands::Onboard {
            exam_style,
            learning_depth,
            material_preference,
            practice_style,
            ai_persona,
        } => {
            let profile = OnboardingProfile {
                exam_style,
                learning_depth,
                material_preference,
                practice_style,
                ai_persona,
            };
            runtime.block_on(handle_onboard_command(&mut client, &profile))?;
        }

        Commands::Account { command } => {
            runtime.block_on(handle_account_command(&mut client, command))?;
        }

        Commands::Subjects { command } => {
            runtime.block_on(handle_subjects_command(&mut client, command))?;
        }

        Commands::Weeks { command } => {
            runtime.block_on(handle_weeks_command(&mut client, command))?;
        }

        Commands::Concept {
            week,
            mode,
            regenerate,
        } => {
            runtime.block_on(handle_concept_command(
                &mut client,
                week,
                mode.into(),
                regenerate,
            ))?;
        }

        Commands::Quiz { command } => {
            runtime.block_on(handle_quiz_command(&mut client, command))?;
        }

        Commands::Plan { command } => {
            runtime.block_on(handle_plan_command(&client, command))?;
        }

        Commands::Exam { command } => {
            runtime.block_on(handle_exam_command(&client, command))?;
        }

        Commands::Notify { subject, state } => {
            let updated = runtime
                .block_on(client.api.toggle_notification(subject, state.is_on()))
                .with_context(|| format!("Failed to change notifications of subject {}", subject))?;
            println!(
                "✓ Exam notifications of {} turned {}",
                updated.name,
                if state.is_on() { "on" } else { "off" }
            );
        }
    }

    Ok(())
}

/// Backend client, settings and local cache of one invocation
struct Client {
    config: ClientConfig,
    api: ApiClient,
    store: FileStore,
}

impl Client {
    fn open(config: ClientConfig) -> Result<Self> {
        let api = ApiClient::new(&config).context("Failed to build HTTP client")?;
        let store_path = config.store_path();
        let store = FileStore::open(&store_path)
            .with_context(|| format!("Failed to open local store {}", store_path.display()))?;

        Ok(Self { config, api, store })
    }

    /// Signed-in user id, or an error asking to log in
    fn user_id(&self) -> Result<u64> {
        session::stored_user_id(&self.store)
            .ok_or(ApiError::NoSession)
            .context("Run 'studyflow login' first")
    }
}

/// Where the report text comes from
enum ReportSource {
    File(PathBuf),
    Quiz(u64),
}

/// Handle the report command
async fn handle_report_command(
    client: &Client,
    source: ReportSource,
    output: Option<PathBuf>,
    format: Option<ReportFormat>,
    title: Option<String>,
) -> Result<()> {
    let (text, mut meta) = match source {
        ReportSource::File(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read report {}", path.display()))?;
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            (text, ReportMeta::titled(stem))
        }
        ReportSource::Quiz(quiz_id) => {
            let detail = client
                .api
                .get_quiz(quiz_id)
                .await
                .with_context(|| format!("Failed to load quiz {}", quiz_id))?;
            let Some(report) = detail.report else {
                bail!("Quiz {} has not been graded yet", quiz_id);
            };
            let meta = ReportMeta {
                title: format!("퀴즈 #{} 분석 리포트", detail.quiz.quiz_number),
                score: Some((report.score, report.total)),
                created_at: Some(report.created_at),
            };
            (report.ai_report, meta)
        }
    };

    if let Some(title) = title {
        meta.title = title;
    }

    let outline = parse_report(&text);
    log::info!(
        "Parsed report into {} sections ({} numbered)",
        outline.sections.len(),
        outline.numbered_count()
    );

    let format = format.unwrap_or_else(|| infer_format(output.as_deref()));

    match (output, format) {
        (Some(path), ReportFormat::Html) => {
            to_html(&outline, &meta, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Wrote HTML report to {}", path.display());
        }
        (Some(path), ReportFormat::Markdown) => {
            to_markdown(&outline, &meta, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Wrote markdown report to {}", path.display());
        }
        (None, ReportFormat::Html) => print!("{}", render_html(&outline, &meta)),
        (None, ReportFormat::Markdown) => print!("{}", render_markdown(&outline, &meta)),
    }

    Ok(())
}

/// HTML for `.html`/`.htm` outputs, markdown otherwise
fn infer_format(output: Option<&Path>) -> ReportFormat {
    let extension = output
        .and_then(|p| p.extension())
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("html" | "htm") => ReportFormat::Html,
        _ => ReportFormat::Markdown,
    }
}

/// Handle the route command
///
/// Works offline: the stored session decides whether the address is
/// reachable.
fn handle_route_command(store: FileStore, url: &str) -> Result<()> {
    let location = Location::parse(url);
    let route = location.route();
    let signed_in = session::stored_user_id(&store).is_some();
    let onboarding_completed = session::onboarding_completed(&store);

    let mut app = App::new(MemoryNavigator::new("/"), store);
    if signed_in {
        app.dispatch(ScreenEvent::LoggedIn {
            onboarding_completed,
        })?;
    }
    let screen = app.dispatch(ScreenEvent::Navigate(route.clone()))?.clone();

    println!("Location: {}", location);
    println!("Route:    {:?}", route);
    println!("Screen:   {}", screen);
    println!("Address:  {}", screen.path());
    if !signed_in {
        println!("(not signed in)");
    }

    Ok(())
}

/// Handle the login command
async fn handle_login_command(client: &mut Client, login_id: &str, password: &str) -> Result<()> {
    let request = validation::validate_login(login_id, password)?;

    let envelope = client.api.login(&request).await.context("Login failed")?;
    let Some(user) = envelope.user else {
        bail!("Login response did not include a user");
    };

    session::remember_login(&mut client.store, &user).context("Failed to store session")?;

    let next = transition(
        &Screen::Login,
        ScreenEvent::LoggedIn {
            onboarding_completed: user.onboarding_completed,
        },
    );
    println!("✓ Signed in as {}", user.username);
    if next == Screen::Onboarding {
        println!("Onboarding is not finished yet, run 'studyflow onboard'");
    }

    Ok(())
}

/// Handle the logout command
fn handle_logout_command(client: &mut Client) -> Result<()> {
    session::forget(&mut client.store).context("Failed to clear session")?;
    println!("✓ Signed out");
    Ok(())
}

/// Handle the signup command
async fn handle_signup_command(client: &mut Client, form: &SignUpForm) -> Result<()> {
    let request = form.validate()?;

    let envelope = client
        .api
        .register(&request)
        .await
        .context("Sign-up failed")?;

    if let Some(user) = envelope.user {
        session::remember_login(&mut client.store, &user).context("Failed to store session")?;
    }

    let next = transition(&Screen::SignUp, ScreenEvent::SignedUp);
    println!("✓ Account {} created", request.login_id);
    if next == Screen::Welcome {
        println!("Next: run 'studyflow onboard' to tell the tutor how you study");
    }

    Ok(())
}

/// Handle the whoami command
async fn handle_whoami_command(client: &mut Client) -> Result<()> {
    let api = &client.api;
    let restored = session::restore(&mut client.store, "/", |user_id| async move {
        api.get_user(user_id).await.map(|envelope| envelope.user)
    })
    .await?;

    match restored.user {
        Some(user) => {
            println!("User:   {}", user.username);
            if let Some(login_id) = &user.login_id {
                println!("Login:  {}", login_id);
            }
            println!("School: {} {} ({}학년)", user.school, user.major, user.grade);
            println!("Opens:  {}", restored.screen);
        }
        None => println!("Not signed in"),
    }

    Ok(())
}

/// Handle the onboard command
async fn handle_onboard_command(client: &mut Client, profile: &OnboardingProfile) -> Result<()> {
    let user_id = client.user_id()?;

    let envelope = client
        .api
        .save_profile(user_id, profile)
        .await
        .context("Failed to save onboarding answers")?;

    match envelope.user {
        Some(user) => session::remember_login(&mut client.store, &user)?,
        None => client.store.set(keys::ONBOARDING_COMPLETED, "true")?,
    }

    let next = transition(&Screen::Onboarding, ScreenEvent::OnboardingDone);
    println!("✓ Onboarding complete, opening {}", next);
    Ok(())
}

/// Handle the account subcommands
async fn handle_account_command(client: &mut Client, command: AccountCommands) -> Result<()> {
    let user_id = client.user_id()?;

    match command {
        AccountCommands::Profile {
            username,
            email,
            school,
            major,
            grade,
        } => {
            let update = ProfileUpdate {
                username,
                email,
                school,
                major,
                grade,
            };
            let envelope = client
                .api
                .update_profile(user_id, &update)
                .await
                .context("Failed to update profile")?;
            if let Some(user) = envelope.user {
                session::remember_login(&mut client.store, &user)?;
            }
            println!("✓ Profile updated");
        }

        AccountCommands::Password {
            current,
            new,
            confirm,
        } => {
            validation::validate_password_change(&new, &confirm)?;
            client
                .api
                .change_password(user_id, &current, &new)
                .await
                .context("Failed to change password")?;
            println!("✓ Password changed");
        }

        AccountCommands::Preferences {
            theme,
            email_notifications,
            push_notifications,
        } => {
            let preferences = Preferences {
                theme,
                email_notifications: email_notifications.map(cli::Toggle::is_on),
                push_notifications: push_notifications.map(cli::Toggle::is_on),
            };
            client
                .api
                .update_preferences(user_id, &preferences)
                .await
                .context("Failed to save preferences")?;
            println!("✓ Preferences saved");
        }

        AccountCommands::Delete { confirm } => {
            validation::validate_delete_confirmation(&confirm)?;
            client
                .api
                .delete_account(user_id)
                .await
                .context("Failed to delete account")?;
            session::forget(&mut client.store)?;
            println!("✓ Account deleted");
        }
    }

    Ok(())
}

/// Handle the subjects subcommands
async fn handle_subjects_command(client: &mut Client, command: SubjectCommands) -> Result<()> {
    let user_id = client.user_id()?;
    let api = &client.api;

    match command {
        SubjectCommands::List => {
            let mut subjects = api
                .list_subjects(user_id)
                .await
                .context("Failed to load subjects")?;
            optimistic::sort_by_display_order(&mut subjects);
            print_subject_list(&subjects);
        }

        SubjectCommands::Show { subject } => {
            let subject = api
                .get_subject(subject)
                .await
                .with_context(|| format!("Failed to load subject {}", subject))?;
            print_subject(&subject);
        }

        SubjectCommands::Reorder { active, over } => {
            let mut subjects = api
                .list_subjects(user_id)
                .await
                .context("Failed to load subjects")?;
            optimistic::sort_by_display_order(&mut subjects);

            let moved = optimistic::reorder_subjects(&mut subjects, active, over, |ids| async move {
                api.reorder_subjects(user_id, &ids).await
            })
            .await
            .context("Failed to save the new order")?;

            if moved {
                println!("✓ Subject order saved");
            } else {
                println!("Order unchanged");
            }
            print_subject_list(&subjects);
        }

        SubjectCommands::Color { subject, color } => {
            validation::validate_color(&color)?;

            let mut subjects = api
                .list_subjects(user_id)
                .await
                .context("Failed to load subjects")?;
            optimistic::sort_by_display_order(&mut subjects);
            if !subjects.iter().any(|s| s.id == subject) {
                bail!("Subject {} not found", subject);
            }

            optimistic::recolor_subject(
                &mut subjects,
                subject,
                &color,
                || api.update_subject_color(subject, user_id, &color),
                || api.list_subjects(user_id),
            )
            .await
            .context("Failed to change the colour")?;
            println!("✓ Colour of subject {} set to {}", subject, color);
        }

        SubjectCommands::Delete { subject } => {
            let existing = api
                .get_subject(subject)
                .await
                .with_context(|| format!("Failed to load subject {}", subject))?;
            api.delete_subject(subject)
                .await
                .with_context(|| format!("Failed to delete subject {}", subject))?;

            for week in &existing.weeks {
                concept::invalidate_week(&mut client.store, week.id)?;
            }
            println!("✓ Deleted {}", existing.name);
        }

        SubjectCommands::Create {
            name,
            syllabus,
            subject_type,
        } => {
            let upload = read_upload(&syllabus)?;

            let mut progress = StagedProgress::syllabus_upload();
            let created = run_with_progress(
                api.create_subject(user_id, &name, &subject_type, upload),
                STAGED_TICK,
                || {
                    progress.tick();
                    format!("{} {}%", progress.label(), progress.percent())
                },
            )
            .await
            .context("Failed to create subject")?;
            println!("✓ Created {} (id {})", created.name, created.id);

            let subject = wait_for_analysis(api, &client.config, created.id).await?;
            print_subject(&subject);
        }

        SubjectCommands::Wait { subject } => {
            let subject = wait_for_analysis(api, &client.config, subject).await?;
            print_subject(&subject);
        }

        SubjectCommands::UploadPdf { subject, file } => {
            let upload = read_upload(&file)?;
            let response = api
                .upload_learning_pdf(subject, upload)
                .await
                .context("Failed to upload learning PDF")?;
            println!(
                "✓ Uploaded learning PDF {} (id {})",
                response.learning_pdf.file_name, response.learning_pdf.id
            );
        }
    }

    Ok(())
}

/// Poll a subject until its syllabus analysis settles
async fn wait_for_analysis(api: &ApiClient, config: &ClientConfig, subject_id: u64) -> Result<Subject> {
    let subject = polling::wait_for_analysis(
        || api.get_subject(subject_id),
        config.poll_interval(),
        config.poll_max_attempts,
    )
    .await
    .with_context(|| format!("Syllabus analysis of subject {} did not finish", subject_id))?;

    match AnalysisState::of(&subject) {
        AnalysisState::Ready => println!("✓ Syllabus analysis ready"),
        _ => println!("No syllabus text to analyse"),
    }
    Ok(subject)
}

/// Handle the weeks subcommands
async fn handle_weeks_command(client: &mut Client, command: WeekCommands) -> Result<()> {
    match command {
        WeekCommands::Add {
            subject,
            number,
            title,
            description,
        } => {
            let week = client
                .api
                .create_week(subject, number, &title, description.as_deref())
                .await
                .context("Failed to create week")?;
            println!("✓ Added week {} (id {})", week.week_number, week.id);
        }

        WeekCommands::Upload {
            week,
            file,
            subject,
            number,
        } => {
            let upload = read_upload(&file)?;
            let response = client
                .api
                .upload_material(week, upload, subject, number)
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;

            concept::invalidate_week(&mut client.store, response.material.week_id)?;
            println!(
                "✓ Uploaded {} (material {})",
                response.material.file_name, response.material.id
            );
        }

        WeekCommands::RemoveMaterial { material } => {
            let response = client
                .api
                .delete_material(material)
                .await
                .with_context(|| format!("Failed to delete material {}", material))?;

            if let Some(week_id) = response.week_id {
                concept::invalidate_week(&mut client.store, week_id)?;
            }
            println!("✓ {}", response.message);
        }

        WeekCommands::Topic {
            subject,
            week_no,
            topic,
        } => {
            let updated = client
                .api
                .update_week_topic(subject, week_no, &topic)
                .await
                .context("Failed to update the week topic")?;
            println!("✓ Week {} of {} is now '{}'", week_no, updated.name, topic);
        }
    }

    Ok(())
}

/// Handle the concept command
async fn handle_concept_command(
    client: &mut Client,
    week_id: u64,
    mode: ConceptMode,
    regenerate: bool,
) -> Result<()> {
    if !regenerate {
        if let Some(content) = concept::cached(&client.store, week_id, mode) {
            log::debug!("Concept text of week {} served from cache", week_id);
            println!("{}", content);
            return Ok(());
        }
    }

    let api = &client.api;
    let request = ConceptRequest {
        week_id,
        mode,
        force_regenerate: regenerate,
    };

    let mut progress = ConceptProgress::new();
    let mut rng = rand::rng();
    let content = run_with_progress(
        concept::generate(&mut client.store, request, |request| async move {
            api.generate_concept_content(&request).await
        }),
        CONCEPT_TICK,
        || {
            progress.tick(&mut rng);
            format!("AI가 내용을 생성하고 있습니다... {}%", progress.percent())
        },
    )
    .await?;

    println!("{}", content);
    Ok(())
}

/// Handle the quiz subcommands
async fn handle_quiz_command(client: &mut Client, command: QuizCommands) -> Result<()> {
    let user_id = client.user_id()?;
    let api = &client.api;

    match command {
        QuizCommands::Generate {
            subject,
            weeks,
            types,
            difficulty,
            language,
            num,
            past_exam,
        } => {
            let past_exam_context = past_exam
                .map(|path| {
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))
                })
                .transpose()?;

            let options = QuizOptions {
                week_numbers: weeks,
                difficulty: difficulty.into(),
                question_types: types.into_iter().map(Into::into).collect(),
                language: language.into(),
                num_questions: num,
                past_exam_context,
            };
            validation::validate_quiz_options(&options)?;

            let mut progress = ConceptProgress::new();
            let mut rng = rand::rng();
            let generated = run_with_progress(
                api.generate_quiz(subject, user_id, &options),
                CONCEPT_TICK,
                || {
                    progress.tick(&mut rng);
                    format!("퀴즈 생성 중... {}%", progress.percent())
                },
            )
            .await
            .context("Failed to generate quiz")?;

            println!(
                "✓ Quiz #{} created (id {}, {})",
                generated.quiz.quiz_number,
                generated.quiz.id,
                format_week_scope(&generated.quiz.week_numbers)
            );
            for question in &generated.questions {
                println!("  {}. {}", question.order, question.question_text);
            }
        }

        QuizCommands::Show { quiz, mode } => {
            let mode = QuizMode::sync_store(&mut client.store, quiz, mode.map(Into::into))?;
            let detail = api
                .get_quiz(quiz)
                .await
                .with_context(|| format!("Failed to load quiz {}", quiz))?;

            let session = QuizSession::open(detail, mode);
            print_quiz(&session);
        }

        QuizCommands::Submit { quiz, answers } => {
            let detail = api
                .get_quiz(quiz)
                .await
                .with_context(|| format!("Failed to load quiz {}", quiz))?;
            let mut session = QuizSession::open(detail, QuizMode::Retake);

            for (question_id, answer) in answers {
                if !session.answer(question_id, answer) {
                    log::warn!("Quiz {} has no question {}", quiz, question_id);
                }
            }

            let unanswered: Vec<u32> = session.unanswered().iter().map(|q| q.order).collect();
            if !unanswered.is_empty() {
                println!("Unanswered questions: {:?}", unanswered);
            }

            let payload = session.answers_payload();
            let mut progress = ConceptProgress::new();
            let mut rng = rand::rng();
            let response = run_with_progress(
                api.submit_quiz(quiz, user_id, &payload),
                CONCEPT_TICK,
                || {
                    progress.tick(&mut rng);
                    format!("채점 중... {}%", progress.percent())
                },
            )
            .await
            .context("Failed to submit quiz")?;

            session.apply_submission(response);
            QuizMode::View.remember(&mut client.store, quiz)?;
            print_quiz(&session);
        }

        QuizCommands::History { subject } => {
            let quizzes = api
                .quiz_history(subject, user_id)
                .await
                .with_context(|| format!("Failed to load quizzes of subject {}", subject))?;

            if quizzes.is_empty() {
                println!("No quizzes yet");
            }
            for summary in &quizzes {
                let score = summary
                    .report
                    .as_ref()
                    .map(|r| match studyflow::quiz::percentage(r.score, r.total) {
                        Some(pct) => format!("{}/{} ({}%)", r.score, r.total, pct),
                        None => format!("{}/{}", r.score, r.total),
                    })
                    .unwrap_or_else(|| "not submitted".to_string());
                println!(
                    "#{:<3} id {:<5} {:<20} {:?}  {}",
                    summary.quiz.quiz_number,
                    summary.quiz.id,
                    format_week_scope(&summary.quiz.week_numbers),
                    summary.quiz.difficulty,
                    score
                );
            }
        }

        QuizCommands::Delete { quiz } => {
            api.delete_quiz(quiz, user_id)
                .await
                .with_context(|| format!("Failed to delete quiz {}", quiz))?;
            QuizMode::View.remember(&mut client.store, quiz)?;
            println!("✓ Deleted quiz {}", quiz);
        }
    }

    Ok(())
}

/// Handle the plan subcommands
async fn handle_plan_command(client: &Client, command: PlanCommands) -> Result<()> {
    let api = &client.api;

    match command {
        PlanCommands::Generate { subject } => {
            let user_id = client.user_id()?;
            let loaded = api
                .get_subject(subject)
                .await
                .with_context(|| format!("Failed to load subject {}", subject))?;
            let Some(exam) = loaded.exam_date.as_deref().and_then(schedule::parse_exam_date) else {
                bail!("Set an exam date first with 'studyflow exam set'");
            };

            let mut progress = StagedProgress::study_plan();
            let plan = run_with_progress(api.generate_study_plan(subject, user_id), STAGED_TICK, || {
                progress.tick();
                format!("{} {}%", progress.label(), progress.percent())
            })
            .await
            .context("Failed to generate study plan")?;

            println!("✓ Study plan ready ({} days)", plan.plan.len());
            let rows = schedule::plan_rows(&plan, schedule::korea_today(), exam);
            print_plan(&rows);
        }

        PlanCommands::Show { subject, csv } => {
            let loaded = api
                .get_subject(subject)
                .await
                .with_context(|| format!("Failed to load subject {}", subject))?;
            let Some(exam) = loaded.exam_date.as_deref().and_then(schedule::parse_exam_date) else {
                bail!("{} has no exam date", loaded.name);
            };
            let Some(plan) = &loaded.study_plan else {
                bail!("{} has no study plan yet, run 'studyflow plan generate'", loaded.name);
            };

            let today = schedule::korea_today();
            println!(
                "{}: exam on {} ({} days left)",
                loaded.name,
                exam,
                schedule::days_left(exam, today)
            );

            let rows = schedule::plan_rows(plan, today, exam);
            print_plan(&rows);

            if let Some(path) = csv {
                schedule::export_plan_csv(&rows, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("✓ Wrote calendar to {}", path.display());
            }
        }
    }

    Ok(())
}

/// Handle the exam subcommands
async fn handle_exam_command(client: &Client, command: ExamCommands) -> Result<()> {
    match command {
        ExamCommands::Set {
            subject,
            date,
            exam_type,
            start,
            end,
        } => {
            let exam = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid exam date '{}', expected YYYY-MM-DD", date))?;
            validation::validate_exam_range(start, end)?;

            let request = ExamDateRequest {
                exam_date: exam.format("%Y-%m-%d").to_string(),
                exam_type: exam_type.map(Into::into),
                exam_week_start: start,
                exam_week_end: end,
            };
            let updated = client
                .api
                .set_exam_date(subject, &request)
                .await
                .context("Failed to set exam date")?;

            let badge = schedule::d_day_label(exam, schedule::korea_today())
                .unwrap_or_else(|| "past".to_string());
            println!("✓ Exam of {} set to {} ({})", updated.name, exam, badge);
        }

        ExamCommands::Clear { subject } => {
            let updated = client
                .api
                .clear_exam_date(subject)
                .await
                .context("Failed to clear exam date")?;
            println!("✓ Exam date of {} cleared", updated.name);
        }
    }

    Ok(())
}

/// Drive a fake progress line on stderr until `task` finishes
async fn run_with_progress<T, Fut, A>(task: Fut, every: Duration, mut advance: A) -> T
where
    Fut: Future<Output = T>,
    A: FnMut() -> String,
{
    tokio::pin!(task);
    let mut ticker = tokio::time::interval(every);

    loop {
        tokio::select! {
            output = &mut task => {
                eprintln!();
                return output;
            }
            _ = ticker.tick() => eprint!("\r{}", advance()),
        }
    }
}

/// Read a file for multipart upload
fn read_upload(path: &Path) -> Result<Upload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(Upload { file_name, bytes })
}

fn print_subject_list(subjects: &[Subject]) {
    if subjects.is_empty() {
        println!("No subjects yet");
        return;
    }

    let today = schedule::korea_today();
    for subject in subjects {
        let d_day = subject
            .exam_date
            .as_deref()
            .and_then(schedule::parse_exam_date)
            .and_then(|exam| schedule::d_day_label(exam, today))
            .unwrap_or_default();
        println!(
            "{:>4}  {:<24} {}  {:<6} {}",
            subject.id,
            subject.name,
            concept::subject_color(subject),
            d_day,
            analysis_label(&AnalysisState::of(subject))
        );
    }
}

fn print_subject(subject: &Subject) {
    println!("{} (id {})", subject.name, subject.id);
    println!("  type:   {}", subject.subject_type);
    println!("  colour: {}", concept::subject_color(subject));
    if let Some(exam) = &subject.exam_date {
        println!("  exam:   {}", exam);
    }
    println!("  syllabus: {}", analysis_label(&AnalysisState::of(subject)));

    if let Some(analysis) = &subject.syllabus_analysis {
        for topic in &analysis.weekly_schedule {
            println!("    {:>2}주차  {}", topic.week_no, topic.topic);
        }
    }

    for week in &subject.weeks {
        println!("  week {} (id {}): {}", week.week_number, week.id, week.title);
        for material in &week.materials {
            println!("    - {} (id {})", material.file_name, material.id);
        }
    }
}

fn analysis_label(state: &AnalysisState) -> String {
    match state {
        AnalysisState::Ready => "analysed".to_string(),
        AnalysisState::Failed(message) => format!("failed: {}", message),
        AnalysisState::Pending => "analysing".to_string(),
        AnalysisState::NoSyllabus => "no syllabus".to_string(),
    }
}

fn print_quiz(session: &QuizSession) {
    let quiz = &session.detail().quiz;
    println!(
        "Quiz #{} ({}, {})",
        quiz.quiz_number,
        format_week_scope(&quiz.week_numbers),
        session.mode()
    );

    for question in session.questions() {
        println!();
        println!("{}. {}", question.order, question.question_text);
        if let Some(options) = &question.options {
            for option in options {
                println!("   - {}", option);
            }
        }
        if let Some(answer) = session.answer_of(question.id) {
            println!("   answer: {}", answer);
        }
        if session.is_submitted() {
            if let Some(result) = session.result_for(question.id) {
                let mark = if result.is_correct { "✓" } else { "✗" };
                println!("   {} correct answer: {}", mark, result.correct_answer);
                if !result.explanation.is_empty() {
                    println!("   {}", result.explanation);
                }
            }
        }
    }

    if !session.is_submitted() {
        return;
    }

    println!();
    match session.percentage() {
        Some(pct) => println!("Score: {}/{} ({}%)", session.score(), session.total(), pct),
        None => println!("Score: {}/{}", session.score(), session.total()),
    }

    if let Some(report) = session.report() {
        let meta = ReportMeta {
            title: String::new(),
            score: Some((report.score, report.total)),
            created_at: Some(report.created_at.clone()),
        };
        println!();
        print!("{}", render_markdown(&parse_report(&report.ai_report), &meta));
    }
}

fn print_plan(rows: &[schedule::PlanRow]) {
    let mut current_week = 0;
    for row in rows {
        if row.week != current_week {
            current_week = row.week;
            println!("Week {}", current_week);
        }
        let marker = if row.is_exam_day {
            " [시험]"
        } else if row.is_today {
            " [오늘]"
        } else {
            ""
        };
        println!("  {} ({}){}  {}", row.date, row.weekday, marker, row.task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_format() {
        assert!(matches!(
            infer_format(Some(Path::new("out/report.html"))),
            ReportFormat::Html
        ));
        assert!(matches!(
            infer_format(Some(Path::new("report.HTM"))),
            ReportFormat::Html
        ));
        assert!(matches!(
            infer_format(Some(Path::new("report.md"))),
            ReportFormat::Markdown
        ));
        assert!(matches!(infer_format(None), ReportFormat::Markdown));
    }

    #[test]
    fn test_analysis_label() {
        assert_eq!(analysis_label(&AnalysisState::Ready), "analysed");
        assert_eq!(
            analysis_label(&AnalysisState::Failed("파일 오류".to_string())),
            "failed: 파일 오류"
        );
    }

    #[tokio::test]
    async fn test_run_with_progress_returns_task_output() {
        let mut ticks = 0;
        let output = run_with_progress(async { 42 }, Duration::from_millis(10), || {
            ticks += 1;
            format!("{}", ticks)
        })
        .await;

        assert_eq!(output, 42);
    }
}
