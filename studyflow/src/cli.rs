//! Command-line interface definitions for studyflow

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use studyflow::api::{ConceptMode, Difficulty, ExamType, QuestionType, QuizLanguage};
use studyflow::router::QuizMode;

/// Output format for the report command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    /// Standalone HTML page
    Html,
    /// Markdown, also used for terminal output
    Markdown,
}

/// Concept explanation depth
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ModeArg {
    /// Short overview of the week
    #[default]
    Summary,
    /// Detailed explanation
    DeepDive,
}

impl From<ModeArg> for ConceptMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Summary => ConceptMode::Summary,
            ModeArg::DeepDive => ConceptMode::DeepDive,
        }
    }
}

/// Quiz difficulty
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum DifficultyArg {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(difficulty: DifficultyArg) -> Self {
        match difficulty {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

/// Quiz question type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum QuestionTypeArg {
    MultipleChoice,
    ShortAnswer,
    Subjective,
}

impl From<QuestionTypeArg> for QuestionType {
    fn from(kind: QuestionTypeArg) -> Self {
        match kind {
            QuestionTypeArg::MultipleChoice => QuestionType::MultipleChoice,
            QuestionTypeArg::ShortAnswer => QuestionType::ShortAnswer,
            QuestionTypeArg::Subjective => QuestionType::Subjective,
        }
    }
}

/// Quiz language
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LanguageArg {
    #[default]
    Korean,
    English,
}

impl From<LanguageArg> for QuizLanguage {
    fn from(language: LanguageArg) -> Self {
        match language {
            LanguageArg::Korean => QuizLanguage::Korean,
            LanguageArg::English => QuizLanguage::English,
        }
    }
}

/// Exam kind
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExamTypeArg {
    Midterm,
    Final,
}

impl From<ExamTypeArg> for ExamType {
    fn from(kind: ExamTypeArg) -> Self {
        match kind {
            ExamTypeArg::Midterm => ExamType::Midterm,
            ExamTypeArg::Final => ExamType::Final,
        }
    }
}

/// How a stored quiz is opened
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum QuizModeArg {
    /// Show the stored answers and report
    View,
    /// Start over with blank answers
    Retake,
}

impl From<QuizModeArg> for QuizMode {
    fn from(mode: QuizModeArg) -> Self {
        match mode {
            QuizModeArg::View => QuizMode::View,
            QuizModeArg::Retake => QuizMode::Retake,
        }
    }
}

/// On/off switch
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        matches!(self, Toggle::On)
    }
}

/// CLI structure for the studyflow application
#[derive(Parser)]
#[command(name = "studyflow")]
#[command(version)]
#[command(about = "AI study assistant client", long_about = None)]
pub struct Cli {
    /// Path to studyflow.toml (defaults to .studyflow/studyflow.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for studyflow
#[derive(Subcommand)]
pub enum Commands {
    /// Render a quiz report as an outline (from a text file or a stored quiz)
    Report {
        /// Report text file
        #[arg(required_unless_present = "quiz")]
        input: Option<PathBuf>,

        /// Fetch the report of this quiz instead
        #[arg(short, long, conflicts_with = "input")]
        quiz: Option<u64>,

        /// Output file (prints markdown to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (inferred from the output extension when omitted)
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,

        /// Title shown above the report
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Show which screen an address resolves to
    Route {
        /// Address such as /quiz/3?mode=retake
        url: String,
    },

    /// Sign in and remember the session
    Login {
        /// Login id
        login_id: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Create an account
    Signup {
        /// Login id (at least 4 characters)
        login_id: String,

        /// Password (8+ characters with upper, lower, digit and special)
        #[arg(short, long)]
        password: String,

        /// Password confirmation
        #[arg(long)]
        password_confirm: String,

        /// Display name
        #[arg(short, long)]
        username: String,

        /// School
        #[arg(long)]
        school: String,

        /// Major
        #[arg(long)]
        major: String,

        /// Grade (1-4)
        #[arg(short, long)]
        grade: String,
    },

    /// Show the signed-in user and the screen a restart would open
    Whoami,

    /// Answer the onboarding questions of the signed-in user
    Onboard {
        /// Preferred exam style
        #[arg(long)]
        exam_style: String,

        /// How deep explanations should go
        #[arg(long)]
        learning_depth: String,

        /// Preferred kind of material
        #[arg(long)]
        material_preference: String,

        /// Preferred practice style
        #[arg(long)]
        practice_style: String,

        /// Tutor persona
        #[arg(long)]
        ai_persona: String,
    },

    /// Change account settings
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Manage weeks and study materials
    Weeks {
        #[command(subcommand)]
        command: WeekCommands,
    },

    /// Manage subjects
    Subjects {
        #[command(subcommand)]
        command: SubjectCommands,
    },

    /// Show the concept explanation of a week
    Concept {
        /// Week id
        week: u64,

        /// Explanation depth
        #[arg(short, long, value_enum, default_value = "summary")]
        mode: ModeArg,

        /// Ignore the cached text and generate again
        #[arg(short, long)]
        regenerate: bool,
    },

    /// Generate, take and review quizzes
    Quiz {
        #[command(subcommand)]
        command: QuizCommands,
    },

    /// Generate and show study plans
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },

    /// Set or clear an exam date
    Exam {
        #[command(subcommand)]
        command: ExamCommands,
    },

    /// Turn exam notifications of a subject on or off
    Notify {
        /// Subject id
        subject: u64,

        /// New state
        #[arg(value_enum)]
        state: Toggle,
    },
}

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Update profile fields
    Profile {
        /// Display name
        #[arg(short, long)]
        username: Option<String>,

        /// E-mail address
        #[arg(short, long)]
        email: Option<String>,

        /// School
        #[arg(long)]
        school: Option<String>,

        /// Major
        #[arg(long)]
        major: Option<String>,

        /// Grade (1-4)
        #[arg(short, long)]
        grade: Option<u8>,
    },

    /// Change the password
    Password {
        /// Current password
        #[arg(long)]
        current: String,

        /// New password (at least 6 characters)
        #[arg(long)]
        new: String,

        /// New password again
        #[arg(long)]
        confirm: String,
    },

    /// Update display and notification preferences
    Preferences {
        /// Colour theme
        #[arg(long)]
        theme: Option<String>,

        /// E-mail notifications
        #[arg(long, value_enum)]
        email_notifications: Option<Toggle>,

        /// Push notifications
        #[arg(long, value_enum)]
        push_notifications: Option<Toggle>,
    },

    /// Delete the account and every subject in it
    Delete {
        /// Type 삭제 to confirm
        #[arg(long)]
        confirm: String,
    },
}

/// Week subcommands
#[derive(Subcommand)]
pub enum WeekCommands {
    /// Add a week to a subject
    Add {
        /// Subject id
        subject: u64,

        /// Week number
        number: u32,

        /// Week title
        title: String,

        /// Week description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Upload a study file to a week
    Upload {
        /// Week id
        week: u64,

        /// File to upload
        file: PathBuf,

        /// Subject id, lets the backend create a missing week
        #[arg(short, long)]
        subject: Option<u64>,

        /// Week number, lets the backend create a missing week
        #[arg(short, long)]
        number: Option<u32>,
    },

    /// Delete a study file
    RemoveMaterial {
        /// Material id
        material: u64,
    },

    /// Rename the topic of a week in the syllabus analysis
    Topic {
        /// Subject id
        subject: u64,

        /// Week number
        week_no: u32,

        /// New topic
        topic: String,
    },
}

/// Subject subcommands
#[derive(Subcommand)]
pub enum SubjectCommands {
    /// List subjects in display order
    List,

    /// Show a subject with its weeks and materials
    Show {
        /// Subject id
        subject: u64,
    },

    /// Move a subject onto the position of another
    Reorder {
        /// Subject being moved
        active: u64,

        /// Subject whose position it takes
        over: u64,
    },

    /// Change the colour of a subject
    Color {
        /// Subject id
        subject: u64,

        /// Colour as #RRGGBB
        color: String,
    },

    /// Delete a subject
    Delete {
        /// Subject id
        subject: u64,
    },

    /// Upload a syllabus as a new subject and wait for its analysis
    Create {
        /// Subject name
        name: String,

        /// Syllabus file
        syllabus: PathBuf,

        /// Subject type
        #[arg(short = 't', long, default_value = "전공")]
        subject_type: String,
    },

    /// Wait until the syllabus analysis of a subject is settled
    Wait {
        /// Subject id
        subject: u64,
    },

    /// Attach a study PDF to a subject
    UploadPdf {
        /// Subject id
        subject: u64,

        /// PDF file
        file: PathBuf,
    },
}

/// Quiz subcommands
#[derive(Subcommand)]
pub enum QuizCommands {
    /// Generate a quiz for a subject
    Generate {
        /// Subject id
        subject: u64,

        /// Weeks covered (repeat or comma-separate)
        #[arg(short, long, value_delimiter = ',')]
        weeks: Vec<u32>,

        /// Question types (repeat or comma-separate)
        #[arg(short = 'k', long = "type", value_enum, value_delimiter = ',')]
        types: Vec<QuestionTypeArg>,

        /// Difficulty
        #[arg(short, long, value_enum, default_value = "medium")]
        difficulty: DifficultyArg,

        /// Question language
        #[arg(short, long, value_enum, default_value = "korean")]
        language: LanguageArg,

        /// Number of questions
        #[arg(short, long, default_value_t = 5)]
        num: u32,

        /// Past exam text to imitate
        #[arg(long)]
        past_exam: Option<PathBuf>,
    },

    /// Show a quiz with its answers, results and report
    Show {
        /// Quiz id
        quiz: u64,

        /// Open mode (defaults to the remembered mode)
        #[arg(short, long, value_enum)]
        mode: Option<QuizModeArg>,
    },

    /// Submit answers to a quiz
    Submit {
        /// Quiz id
        quiz: u64,

        /// Answers as QUESTION_ID=ANSWER
        #[arg(short, long = "answer", value_parser = parse_answer)]
        answers: Vec<(u64, String)>,
    },

    /// List the quizzes of a subject
    History {
        /// Subject id
        subject: u64,
    },

    /// Delete a quiz
    Delete {
        /// Quiz id
        quiz: u64,
    },
}

/// Study plan subcommands
#[derive(Subcommand)]
pub enum PlanCommands {
    /// Ask the backend for a day-by-day plan until the exam
    Generate {
        /// Subject id
        subject: u64,
    },

    /// Show the stored plan as a calendar
    Show {
        /// Subject id
        subject: u64,

        /// Also write the calendar to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// Exam subcommands
#[derive(Subcommand)]
pub enum ExamCommands {
    /// Set the exam date of a subject
    Set {
        /// Subject id
        subject: u64,

        /// Exam date (YYYY-MM-DD)
        date: String,

        /// Exam kind
        #[arg(short = 't', long = "type", value_enum)]
        exam_type: Option<ExamTypeArg>,

        /// First week covered
        #[arg(long)]
        start: Option<u32>,

        /// Last week covered
        #[arg(long)]
        end: Option<u32>,
    },

    /// Remove the exam date of a subject
    Clear {
        /// Subject id
        subject: u64,
    },
}

/// Parse `QUESTION_ID=ANSWER`
fn parse_answer(raw: &str) -> Result<(u64, String), String> {
    let (id, answer) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION_ID=ANSWER, got '{}'", raw))?;
    let id = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid question id '{}'", id))?;
    Ok((id, answer.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("3=B"), Ok((3, "B".to_string())));
        assert_eq!(parse_answer("4=a=b"), Ok((4, "a=b".to_string())));
        assert!(parse_answer("nope").is_err());
        assert!(parse_answer("x=1").is_err());
    }

    #[test]
    fn test_quiz_generate_args() {
        let cli = Cli::parse_from([
            "studyflow", "quiz", "generate", "7", "--weeks", "1,2,3", "--type",
            "multiple-choice,subjective", "-n", "10",
        ]);

        let Commands::Quiz {
            command: QuizCommands::Generate { subject, weeks, types, num, .. },
        } = cli.command
        else {
            panic!("expected quiz generate");
        };
        assert_eq!(subject, 7);
        assert_eq!(weeks, vec![1, 2, 3]);
        assert_eq!(types.len(), 2);
        assert_eq!(num, 10);
    }

    #[test]
    fn test_subjects_upload_pdf_args() {
        let cli = Cli::parse_from(["studyflow", "subjects", "upload-pdf", "4", "notes.pdf"]);

        let Commands::Subjects {
            command: SubjectCommands::UploadPdf { subject, file },
        } = cli.command
        else {
            panic!("expected subjects upload-pdf");
        };
        assert_eq!(subject, 4);
        assert_eq!(file, PathBuf::from("notes.pdf"));
    }

    #[test]
    fn test_report_needs_a_source() {
        assert!(Cli::try_parse_from(["studyflow", "report"]).is_err());
        assert!(Cli::try_parse_from(["studyflow", "report", "--quiz", "3"]).is_ok());
    }
}
