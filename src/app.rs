//! Main application UI and state management.
//! Wires the trail map, practice sessions, weekly events and the teacher
//! panel to the engine. All state mutation happens synchronously inside the
//! frame that handled the click or the timer tick.

use crate::content::{self, Track};
use crate::database::db;
use crate::export::document::{build_export, ExportDocument};
use crate::export::{json, transfer_code};
use crate::generators::GeneratorRegistry;
use crate::models::{Difficulty, Profile, Progress, Session, SessionKind, StreakUpdate};
use crate::report::classroom;
use crate::session::composer::{self, WeeklyVariant};
use crate::session::evaluator::{self, SessionSummary};
use crate::session::timer::{QuestionTimer, TimerEvent};
use chrono::{Local, Utc};
use eframe::egui;
use rusqlite::Connection;

/// Application screen states
#[derive(Default, PartialEq)]
enum AppScreen {
    #[default]
    Home,
    Profiles,
    Trails,
    Practice,
    Session,
    Result,
    Weekly,
    Teacher,
    Settings,
}

/// Practice topics offered on the practice screen.
const PRACTICE_TOPICS: [(&str, &str); 11] = [
    ("Addition", "g2_add_100"),
    ("Subtraction", "g2_sub_100"),
    ("Multiplication", "g4_mul_facts_6_9"),
    ("Division", "g5_div_2digit"),
    ("Compare decimals", "g6_dec_compare"),
    ("Equivalent fractions", "g6_frac_equiv"),
    ("Percent", "g6_percent_simple"),
    ("Order of operations", "g6_order_ops"),
    ("Patterns", "ob_patterns"),
    ("Parity", "ob_parity"),
    ("Counting", "ob_counting"),
];

/// Main application state
pub struct MyApp {
    conn: Connection,
    registry: GeneratorRegistry,
    tracks: Vec<Track>,

    current_screen: AppScreen,
    profiles: Vec<Profile>,
    progress: Option<Progress>,
    status_line: String,

    // Profile creation form
    form_first_name: String,
    form_grade_year: String,
    form_class_group: String,
    form_school_name: String,
    form_start_at_six: bool,

    // Practice form
    practice_topic: usize,
    practice_difficulty: Difficulty,
    practice_count: usize,

    // Active session
    active_session: Option<Session>,
    timer: QuestionTimer,
    show_hint: bool,
    last_feedback: Option<(bool, String)>,
    last_summary: Option<SessionSummary>,
    is_diagnostic: bool,

    // Student export/transfer
    transfer_code_output: String,

    // Teacher panel
    teacher_docs: Vec<ExportDocument>,
    teacher_school: Option<String>,
    teacher_class: Option<String>,
    teacher_report_text: String,
    teacher_code_input: String,
}

fn sanitize_file(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .take(40)
        .collect()
}

impl MyApp {
    pub fn new(conn: Connection) -> Self {
        let profiles = db::list_profiles(&conn).unwrap_or_default();
        let mut app = Self {
            conn,
            registry: GeneratorRegistry::new(),
            tracks: content::tracks(),
            current_screen: AppScreen::Home,
            profiles,
            progress: None,
            status_line: String::new(),
            form_first_name: String::new(),
            form_grade_year: "6".to_string(),
            form_class_group: String::new(),
            form_school_name: String::new(),
            form_start_at_six: true,
            practice_topic: 0,
            practice_difficulty: Difficulty::Mid,
            practice_count: 10,
            active_session: None,
            timer: QuestionTimer::new(),
            show_hint: false,
            last_feedback: None,
            last_summary: None,
            is_diagnostic: false,
            transfer_code_output: String::new(),
            teacher_docs: Vec::new(),
            teacher_school: None,
            teacher_class: None,
            teacher_report_text: String::new(),
            teacher_code_input: String::new(),
        };
        if let Ok(Some(active)) = db::get_active_profile_id(&app.conn) {
            if app.profiles.iter().any(|p| p.profile_id == active) {
                app.set_active_profile(&active);
            }
        }
        app.reload_teacher_docs();
        app
    }

    /// Switches the active profile, replacing all in-memory learner state
    /// with the new namespace's.
    fn set_active_profile(&mut self, profile_id: &str) {
        let Some(profile) = self.profiles.iter().find(|p| p.profile_id == profile_id).cloned()
        else {
            return;
        };
        let progress = match db::load_progress(&self.conn, profile_id) {
            Ok(Some(progress)) => progress,
            Ok(None) => {
                let fresh = Progress::new_for_profile(&profile, Utc::now());
                db::save_progress_best_effort(&self.conn, &fresh);
                fresh
            }
            Err(e) => {
                log::warn!("could not load progress for {}: {}", profile_id, e);
                Progress::new_for_profile(&profile, Utc::now())
            }
        };
        if let Err(e) = db::set_active_profile_id(&self.conn, profile_id) {
            log::warn!("could not persist active profile: {}", e);
        }
        self.active_session = None;
        self.timer.cancel();
        self.transfer_code_output.clear();
        self.progress = Some(progress);
    }

    fn save_progress(&self) {
        if let Some(progress) = &self.progress {
            db::save_progress_best_effort(&self.conn, progress);
        }
    }

    fn reload_teacher_docs(&mut self) {
        let raw = db::load_teacher_imports(&self.conn).unwrap_or_default();
        let sources: Vec<(String, String)> = raw
            .into_iter()
            .enumerate()
            .map(|(i, json)| (format!("stored #{}", i + 1), json))
            .collect();
        self.teacher_docs = classroom::ingest(&sources).accepted;
    }

    fn toast(&mut self, message: impl Into<String>) {
        self.status_line = message.into();
    }

    /// Cancels any running countdown and arms it for the current question.
    fn begin_question(&mut self) {
        self.timer.cancel();
        self.show_hint = false;
        if let Some(session) = &self.active_session {
            if session.timer_on && !session.is_finished() {
                self.timer.start(session.question_time_secs());
            }
        }
    }

    fn open_session(&mut self, session: Session) {
        self.active_session = Some(session);
        self.last_feedback = None;
        self.current_screen = AppScreen::Session;
        self.begin_question();
    }

    fn handle_answer(&mut self, selected: String) {
        self.timer.cancel();
        let (Some(session), Some(progress)) = (&mut self.active_session, &mut self.progress)
        else {
            return;
        };
        if let Some(outcome) = evaluator::submit_answer(session, progress, &selected, Utc::now()) {
            self.last_feedback = Some((
                outcome.is_correct,
                if outcome.is_correct {
                    format!("Correct! +{} XP", outcome.xp)
                } else {
                    format!("The answer was {}", outcome.correct_answer)
                },
            ));
        }
        self.save_progress();
        self.after_question();
    }

    fn handle_timeout(&mut self) {
        let (Some(session), Some(progress)) = (&mut self.active_session, &mut self.progress)
        else {
            return;
        };
        evaluator::submit_timeout(session, progress, Utc::now());
        self.last_feedback = Some((false, "Time is up.".to_string()));
        self.save_progress();
        self.after_question();
    }

    fn after_question(&mut self) {
        let finished = self.active_session.as_ref().map(|s| s.is_finished()).unwrap_or(true);
        if finished {
            self.finish_active_session();
        } else {
            self.begin_question();
        }
    }

    fn finish_active_session(&mut self) {
        self.timer.cancel();
        let (Some(session), Some(progress)) = (&self.active_session, &mut self.progress) else {
            return;
        };
        let summary = evaluator::finish_session(session, progress, Utc::now());

        if self.is_diagnostic {
            // Placement: a weak check starts at the bottom track with the
            // inclusion pack on; otherwise grade 6
            if summary.score < 0.60 {
                progress.current_track = "g1".to_string();
                progress.settings.inclusion_pack = true;
                progress.settings.focus_mode = true;
                progress.settings.no_timer = true;
                progress.settings.reading_easy = true;
            } else {
                progress.current_track = "g6".to_string();
            }
            self.is_diagnostic = false;
        }

        if let StreakUpdate::Protected { freezes_used } = summary.streak_update {
            self.status_line = format!("{} freeze(s) protected your streak.", freezes_used);
        }

        self.save_progress();
        self.last_summary = Some(summary);
        self.active_session = None;
        self.current_screen = AppScreen::Result;
    }

    fn exit_session(&mut self) {
        // Per-answer commits stand; only the session-level result is skipped
        self.timer.cancel();
        self.active_session = None;
        self.is_diagnostic = false;
        self.current_screen = AppScreen::Home;
    }

    fn start_node_session(&mut self, node: &content::Node, unit_skills: &[&str]) {
        let Some(progress) = &self.progress else { return };
        let mut rng = rand::thread_rng();
        let session =
            composer::compose_node(&self.registry, progress, node, unit_skills, Utc::now(), &mut rng);
        self.is_diagnostic = false;
        self.open_session(session);
    }

    fn start_practice(&mut self, no_timer: bool) {
        let Some(progress) = &self.progress else { return };
        let (_, skill_id) = PRACTICE_TOPICS[self.practice_topic];
        let mut rng = rand::thread_rng();
        let session = composer::compose_practice(
            &self.registry,
            progress,
            &[skill_id.to_string()],
            self.practice_count,
            self.practice_difficulty,
            no_timer,
            Utc::now(),
            &mut rng,
        );
        self.is_diagnostic = false;
        self.open_session(session);
    }

    fn start_spaced_review(&mut self) {
        let Some(progress) = &self.progress else { return };
        let mut rng = rand::thread_rng();
        match composer::compose_spaced_review(&self.registry, progress, Utc::now(), &mut rng) {
            Ok(session) => {
                self.is_diagnostic = false;
                self.open_session(session);
            }
            Err(e) => self.toast(format!("{}. Come back later!", e)),
        }
    }

    fn start_error_drill(&mut self) {
        let Some(progress) = &self.progress else { return };
        let mut rng = rand::thread_rng();
        match composer::compose_error_drill(&self.registry, progress, &mut rng) {
            Ok(session) => {
                self.is_diagnostic = false;
                self.open_session(session);
            }
            Err(e) => self.toast(format!("{}. Nothing to drill!", e)),
        }
    }

    fn start_weekly(&mut self, variant: WeeklyVariant) {
        let Some(progress) = &self.progress else { return };
        let mut rng = rand::thread_rng();
        let today = Local::now().date_naive();
        let session = composer::compose_weekly(&self.registry, progress, variant, today, &mut rng);
        self.is_diagnostic = false;
        self.open_session(session);
    }

    fn start_diagnostic(&mut self) {
        let Some(progress) = &self.progress else { return };
        let mut rng = rand::thread_rng();
        let session = composer::compose_diagnostic(&self.registry, progress, &mut rng);
        self.is_diagnostic = true;
        self.open_session(session);
    }

    fn export_progress(&mut self) {
        let Some(progress) = &self.progress else {
            self.toast("No active profile.");
            return;
        };
        let document = build_export(progress, Utc::now());
        let filename = format!(
            "progress_{}_{}_{}_{}.json",
            sanitize_file(&progress.school.name),
            sanitize_file(&progress.student.class_group),
            sanitize_file(&progress.student.first_name),
            Local::now().format("%Y-%m-%d"),
        );
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(filename)
            .add_filter("JSON files", &["json"])
            .save_file()
        {
            match json::export_json_to_path(&document, &path.to_string_lossy()) {
                Ok(()) => self.toast("Progress exported."),
                Err(e) => self.toast(format!("Export failed: {}", e)),
            }
        }
    }

    fn import_teacher_files(&mut self) {
        let Some(paths) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_files()
        else {
            return;
        };
        let mut sources = Vec::new();
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            match std::fs::read_to_string(&path) {
                Ok(text) => sources.push((name, text)),
                Err(e) => self.toast(format!("Could not read {}: {}", name, e)),
            }
        }
        let outcome = classroom::ingest(&sources);
        for doc in &outcome.accepted {
            let json = match serde_json::to_string(doc) {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("could not re-serialize import: {}", e);
                    continue;
                }
            };
            if let Err(e) = db::upsert_teacher_import(
                &self.conn,
                &doc.profile_id,
                &doc.school.name,
                &doc.student.class_group,
                &json,
            ) {
                log::warn!("could not store import {}: {}", doc.profile_id, e);
            }
        }
        let mut message = format!("Imported {} file(s).", outcome.accepted.len());
        for (name, error) in &outcome.rejected {
            message.push_str(&format!(" Rejected {}: {}.", name, error));
        }
        self.toast(message);
        self.reload_teacher_docs();
    }

    fn teacher_schools(&self) -> Vec<String> {
        let mut schools: Vec<String> =
            self.teacher_docs.iter().map(|d| d.school.name.clone()).collect();
        schools.sort();
        schools.dedup();
        schools
    }

    fn teacher_classes(&self, school: &str) -> Vec<String> {
        let mut classes: Vec<String> = self
            .teacher_docs
            .iter()
            .filter(|d| d.school.name == school)
            .map(|d| d.student.class_group.clone())
            .collect();
        classes.sort();
        classes.dedup();
        classes
    }

    fn selected_class_docs(&self) -> Vec<ExportDocument> {
        let (Some(school), Some(class)) = (&self.teacher_school, &self.teacher_class) else {
            return Vec::new();
        };
        self.teacher_docs
            .iter()
            .filter(|d| &d.school.name == school && &d.student.class_group == class)
            .cloned()
            .collect()
    }
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Drive the countdown from the frame clock
        if self.current_screen == AppScreen::Session && self.timer.is_running() {
            let dt = ctx.input(|i| i.stable_dt);
            if self.timer.tick(dt) == TimerEvent::Expired {
                self.handle_timeout();
            }
            ctx.request_repaint();
        }

        match self.current_screen {
            AppScreen::Home => self.render_home(ctx),
            AppScreen::Profiles => self.render_profiles(ctx),
            AppScreen::Trails => self.render_trails(ctx),
            AppScreen::Practice => self.render_practice(ctx),
            AppScreen::Session => self.render_session(ctx),
            AppScreen::Result => self.render_result(ctx),
            AppScreen::Weekly => self.render_weekly(ctx),
            AppScreen::Teacher => self.render_teacher(ctx),
            AppScreen::Settings => self.render_settings(ctx),
        }
    }
}

impl MyApp {
    fn render_home(&mut self, ctx: &egui::Context) {
        let mut buy_freeze = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Math Trails");
            match &self.progress {
                Some(progress) => {
                    ui.label(format!(
                        "{} • {} • {} • {}",
                        progress.student.first_name,
                        content::grade_label(progress.student.grade_year),
                        progress.student.class_group,
                        progress.school.name
                    ));
                    ui.label(format!(
                        "Streak: {} (best {}) • Freezes: {} • Coins: {} • XP: {} • Track: {}",
                        progress.streak.current,
                        progress.streak.best,
                        progress.streak.freezes,
                        progress.coins,
                        progress.xp,
                        content::track_label(&progress.current_track)
                    ));
                }
                None => {
                    ui.label("No profile selected. Create one to start.");
                }
            }
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Trail map").clicked() {
                    if self.progress.is_some() {
                        self.current_screen = AppScreen::Trails;
                    } else {
                        self.current_screen = AppScreen::Profiles;
                    }
                }
                if ui.button("Practice").clicked() && self.progress.is_some() {
                    self.current_screen = AppScreen::Practice;
                }
                if ui.button("Weekly event").clicked() && self.progress.is_some() {
                    self.current_screen = AppScreen::Weekly;
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Spaced review").clicked() {
                    self.start_spaced_review();
                }
                if ui.button("Error drill").clicked() {
                    self.start_error_drill();
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Profiles").clicked() {
                    self.current_screen = AppScreen::Profiles;
                }
                if ui.button("Settings").clicked() && self.progress.is_some() {
                    self.current_screen = AppScreen::Settings;
                }
                if ui.button("Teacher panel").clicked() {
                    self.teacher_school = self.teacher_schools().first().cloned();
                    self.teacher_class = self
                        .teacher_school
                        .as_ref()
                        .and_then(|s| self.teacher_classes(s).first().cloned());
                    self.current_screen = AppScreen::Teacher;
                }
            });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Export progress").clicked() {
                    self.export_progress();
                }
                if ui.button("Transfer code").clicked() {
                    if let Some(progress) = &self.progress {
                        let card = transfer_code::build_report_card(progress, Utc::now());
                        self.transfer_code_output = transfer_code::encode(&card);
                    }
                }
                if ui
                    .button(format!("Buy freeze ({})", crate::models::streak::FREEZE_PRICE))
                    .clicked()
                {
                    buy_freeze = true;
                }
            });

            if !self.transfer_code_output.is_empty() {
                ui.label("Copy this code into the teacher panel of another device:");
                ui.add(
                    egui::TextEdit::multiline(&mut self.transfer_code_output)
                        .desired_rows(2)
                        .desired_width(f32::INFINITY),
                );
            }

            if !self.status_line.is_empty() {
                ui.separator();
                ui.label(&self.status_line);
            }
        });

        if buy_freeze {
            let message = match &mut self.progress {
                Some(progress) => {
                    if progress.buy_freeze() {
                        "Freeze bought!".to_string()
                    } else {
                        "Not enough coins.".to_string()
                    }
                }
                None => "No active profile.".to_string(),
            };
            self.save_progress();
            self.toast(message);
        }
    }

    fn render_profiles(&mut self, ctx: &egui::Context) {
        let mut action_select: Option<String> = None;
        let mut action_delete: Option<String> = None;
        let mut action_create = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Profiles");
            if ui.button("Back").clicked() {
                self.current_screen = AppScreen::Home;
            }
            ui.separator();

            if self.profiles.is_empty() {
                ui.label("No profiles yet. Create one below.");
            }
            egui::ScrollArea::vertical()
                .id_source("profiles_list")
                .max_height(220.0)
                .show(ui, |ui| {
                    for profile in &self.profiles {
                        let is_active = self
                            .progress
                            .as_ref()
                            .map(|p| p.profile_id == profile.profile_id)
                            .unwrap_or(false);
                        ui.horizontal(|ui| {
                            ui.label(format!(
                                "{}{} • {} • {} • {}",
                                profile.first_name,
                                if is_active { " (active)" } else { "" },
                                content::grade_label(profile.grade_year),
                                profile.class_group,
                                profile.school_name
                            ));
                            if ui.button("Enter").clicked() {
                                action_select = Some(profile.profile_id.clone());
                            }
                            if ui.button("Delete").clicked() {
                                action_delete = Some(profile.profile_id.clone());
                            }
                        });
                    }
                });

            ui.separator();
            ui.heading("Create profile");
            ui.horizontal(|ui| {
                ui.label("First name:");
                ui.text_edit_singleline(&mut self.form_first_name);
            });
            ui.horizontal(|ui| {
                ui.label("Grade year (1-12):");
                ui.text_edit_singleline(&mut self.form_grade_year);
            });
            ui.horizontal(|ui| {
                ui.label("Class group:");
                ui.text_edit_singleline(&mut self.form_class_group);
            });
            ui.horizontal(|ui| {
                ui.label("School:");
                ui.text_edit_singleline(&mut self.form_school_name);
            });
            ui.checkbox(
                &mut self.form_start_at_six,
                "Start at grade 6 (with placement check)",
            );
            if ui.button("Create").clicked() {
                action_create = true;
            }

            if !self.status_line.is_empty() {
                ui.separator();
                ui.label(&self.status_line);
            }
        });

        if let Some(profile_id) = action_select {
            self.set_active_profile(&profile_id);
            let needs_diagnostic = self
                .progress
                .as_ref()
                .map(|p| p.start_entry == 6 && p.history.total_sessions == 0)
                .unwrap_or(false);
            if needs_diagnostic {
                self.start_diagnostic();
            } else {
                self.current_screen = AppScreen::Home;
            }
        }
        if let Some(profile_id) = action_delete {
            if let Err(e) = db::delete_profile(&self.conn, &profile_id) {
                log::warn!("could not delete profile {}: {}", profile_id, e);
            }
            self.profiles.retain(|p| p.profile_id != profile_id);
            if self
                .progress
                .as_ref()
                .map(|p| p.profile_id == profile_id)
                .unwrap_or(false)
            {
                self.progress = None;
                self.active_session = None;
            }
            self.toast("Profile deleted.");
        }
        if action_create {
            self.create_profile_from_form();
        }
    }

    fn create_profile_from_form(&mut self) {
        let first_name = self.form_first_name.trim().to_string();
        let grade_year: u8 = self.form_grade_year.trim().parse().unwrap_or(0);
        let class_group = self.form_class_group.trim().to_string();
        let school_name = self.form_school_name.trim().to_string();

        if first_name.is_empty()
            || class_group.is_empty()
            || school_name.is_empty()
            || !(1..=12).contains(&grade_year)
        {
            self.toast("Fill in all fields (grade 1-12).");
            return;
        }

        let now = Utc::now();
        let profile = Profile {
            profile_id: format!("p_{:08x}", rand::random::<u32>()),
            first_name,
            grade_year,
            class_group,
            school_name,
            start_entry: if self.form_start_at_six { 6 } else { 1 },
            created_at: now,
        };
        if let Err(e) = db::insert_profile(&self.conn, &profile) {
            self.toast(format!("Could not create profile: {}", e));
            return;
        }
        self.profiles.insert(0, profile.clone());
        self.form_first_name.clear();
        self.form_class_group.clear();
        self.set_active_profile(&profile.profile_id);
        self.toast("Profile created.");
        if profile.start_entry == 6 {
            self.start_diagnostic();
        } else {
            self.current_screen = AppScreen::Trails;
        }
    }

    fn render_trails(&mut self, ctx: &egui::Context) {
        let Some(progress) = self.progress.clone() else {
            self.current_screen = AppScreen::Profiles;
            return;
        };
        let mut action_node: Option<(content::Node, Vec<&'static str>)> = None;
        let mut action_track: Option<String> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Back").clicked() {
                    self.current_screen = AppScreen::Home;
                }
                ui.heading(format!(
                    "Trail: {} • {}",
                    content::track_label(&progress.current_track),
                    progress.student.first_name
                ));
            });
            ui.label("Pass each boss with at least 80% to unlock the next unit.");

            egui::ComboBox::from_label("Track")
                .selected_text(content::track_label(&progress.current_track))
                .show_ui(ui, |ui| {
                    for track in &self.tracks {
                        if ui
                            .selectable_label(
                                track.track_key == progress.current_track,
                                content::track_label(track.track_key),
                            )
                            .clicked()
                        {
                            action_track = Some(track.track_key.to_string());
                        }
                    }
                });
            ui.separator();

            let track = self
                .tracks
                .iter()
                .find(|t| t.track_key == progress.current_track)
                .unwrap_or(&self.tracks[5]);

            egui::ScrollArea::vertical().id_source("trail_units").show(ui, |ui| {
                for (idx, unit) in track.units.iter().enumerate() {
                    let unlocked = progress.is_unit_unlocked(track, idx);
                    let done = progress
                        .units
                        .get(&unit.boss_node_id())
                        .map(|r| r.passed)
                        .unwrap_or(false);
                    ui.group(|ui| {
                        ui.horizontal(|ui| {
                            ui.label(format!("{}. {}", idx + 1, unit.title));
                            ui.label(if done {
                                "done"
                            } else if unlocked {
                                "open"
                            } else {
                                "locked"
                            });
                        });
                        ui.horizontal(|ui| {
                            for node in unit.nodes() {
                                let passed = progress
                                    .units
                                    .get(&node.node_id)
                                    .map(|r| r.passed)
                                    .unwrap_or(false);
                                let label = if passed {
                                    format!("{} *", node.title)
                                } else {
                                    node.title.to_string()
                                };
                                if ui.add_enabled(unlocked, egui::Button::new(label)).clicked() {
                                    action_node = Some((node.clone(), unit.skill_ids.clone()));
                                }
                            }
                        });
                    });
                }
            });

            if !self.status_line.is_empty() {
                ui.separator();
                ui.label(&self.status_line);
            }
        });

        if let Some(track_key) = action_track {
            if let Some(progress) = &mut self.progress {
                progress.current_track = track_key;
            }
            self.save_progress();
        }
        if let Some((node, skills)) = action_node {
            self.start_node_session(&node, &skills);
        }
    }

    fn render_practice(&mut self, ctx: &egui::Context) {
        let mut start: Option<bool> = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Back").clicked() {
                    self.current_screen = AppScreen::Home;
                }
                ui.heading("Free practice");
            });
            ui.separator();

            egui::ComboBox::from_label("Topic")
                .selected_text(PRACTICE_TOPICS[self.practice_topic].0)
                .show_ui(ui, |ui| {
                    for (i, (label, _)) in PRACTICE_TOPICS.iter().enumerate() {
                        ui.selectable_value(&mut self.practice_topic, i, *label);
                    }
                });

            egui::ComboBox::from_label("Difficulty")
                .selected_text(self.practice_difficulty.label())
                .show_ui(ui, |ui| {
                    for difficulty in [Difficulty::Easy, Difficulty::Mid, Difficulty::Hard] {
                        ui.selectable_value(
                            &mut self.practice_difficulty,
                            difficulty,
                            difficulty.label(),
                        );
                    }
                });

            ui.add(egui::Slider::new(&mut self.practice_count, 5..=20).text("questions"));

            ui.horizontal(|ui| {
                if ui.button("Start").clicked() {
                    start = Some(false);
                }
                if ui.button("Start without timer").clicked() {
                    start = Some(true);
                }
            });
        });
        if let Some(no_timer) = start {
            self.start_practice(no_timer);
        }
    }

    fn render_session(&mut self, ctx: &egui::Context) {
        let mut action_answer: Option<String> = None;
        let mut action_exit = false;
        let mut action_hint = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &self.active_session else {
                return;
            };
            let Some(progress) = &self.progress else {
                return;
            };

            ui.horizontal(|ui| {
                ui.label(session.kind.label());
                ui.label(format!(
                    "{}/{}",
                    (session.idx + 1).min(session.total()),
                    session.total()
                ));
                ui.label(format!("XP {} • Coins {}", progress.xp, progress.coins));
                if ui.button("Exit").clicked() {
                    action_exit = true;
                }
            });

            if session.timer_on {
                ui.add(egui::ProgressBar::new(self.timer.ratio_remaining()));
            }
            ui.separator();

            if let Some((was_correct, message)) = &self.last_feedback {
                ui.colored_label(
                    if *was_correct {
                        egui::Color32::DARK_GREEN
                    } else {
                        egui::Color32::DARK_RED
                    },
                    message,
                );
            }

            if let Some(question) = session.current_question() {
                ui.add_space(10.0);
                ui.heading(&question.prompt);
                ui.add_space(10.0);

                for option in &question.options {
                    if ui
                        .add_sized([260.0, 32.0], egui::Button::new(option))
                        .clicked()
                    {
                        action_answer = Some(option.clone());
                    }
                }

                ui.add_space(10.0);
                if ui.button("Hint").clicked() {
                    action_hint = true;
                }
                if self.show_hint {
                    ui.label(&question.hint);
                }
            }
        });

        if action_hint {
            self.show_hint = true;
        }
        if let Some(selected) = action_answer {
            self.handle_answer(selected);
        }
        if action_exit {
            self.exit_session();
        }
    }

    fn render_result(&mut self, ctx: &egui::Context) {
        let mut action_continue = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(summary) = &self.last_summary else {
                return;
            };
            ui.heading(if summary.passed { "You passed!" } else { "Almost there!" });
            ui.label(format!("Correct: {}/{}", summary.correct, summary.total));
            ui.label(format!("Score: {}%", (summary.score * 100.0).round()));
            ui.label(format!(
                "XP earned: +{} • Coins earned: +{}",
                summary.earned_xp, summary.earned_coins
            ));
            if let Some(stars) = summary.stars {
                ui.label(format!("Stars: {}", "*".repeat(stars as usize)));
            }
            match summary.kind {
                SessionKind::Boss if summary.passed => {
                    ui.label("Boss cleared. The next unit is unlocked.");
                }
                SessionKind::Boss => {
                    ui.label("You need 80% to pass. Try a spaced review first.");
                }
                SessionKind::SpacedReview => {
                    ui.label("Review done. This keeps bosses beatable.");
                }
                _ => {}
            }
            ui.add_space(10.0);
            if ui.button("Continue").clicked() {
                action_continue = true;
            }
        });
        if action_continue {
            self.last_summary = None;
            self.current_screen = AppScreen::Home;
        }
    }

    fn render_weekly(&mut self, ctx: &egui::Context) {
        let mut action_variant: Option<WeeklyVariant> = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Back").clicked() {
                    self.current_screen = AppScreen::Home;
                }
                ui.heading("Weekly event");
            });
            ui.separator();

            let theme = composer::weekly_theme(Local::now().date_naive());
            ui.label(format!("Week {} • Theme: {}", theme.week_key, theme.title));

            let status = self
                .progress
                .as_ref()
                .and_then(|p| p.weekly.get(&theme.week_key))
                .map(|record| {
                    if record.boss_passed {
                        "Challenge cleared"
                    } else if record.warmup_done {
                        "Warm-up done"
                    } else {
                        "Open"
                    }
                })
                .unwrap_or("Open");
            ui.label(format!("Status: {}", status));

            ui.horizontal(|ui| {
                if ui.button("Warm-up (3 questions)").clicked() {
                    action_variant = Some(WeeklyVariant::Warmup);
                }
                if ui.button("Challenge (8 questions)").clicked() {
                    action_variant = Some(WeeklyVariant::Challenge);
                }
            });
        });
        if let Some(variant) = action_variant {
            self.start_weekly(variant);
        }
    }

    fn render_teacher(&mut self, ctx: &egui::Context) {
        let mut action_import = false;
        let mut action_clear = false;
        let mut action_csv = false;
        let mut action_report = false;
        let mut action_read_code = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Back").clicked() {
                    self.current_screen = AppScreen::Home;
                }
                ui.heading("Teacher panel");
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Import files").clicked() {
                    action_import = true;
                }
                if ui.button("Clear panel").clicked() {
                    action_clear = true;
                }
            });

            let schools = self.teacher_schools();
            if schools.is_empty() {
                ui.label("Import learner export files to see a class.");
            } else {
                egui::ComboBox::from_label("School")
                    .selected_text(self.teacher_school.clone().unwrap_or_default())
                    .show_ui(ui, |ui| {
                        for school in &schools {
                            if ui
                                .selectable_label(
                                    self.teacher_school.as_deref() == Some(school),
                                    school,
                                )
                                .clicked()
                            {
                                self.teacher_school = Some(school.clone());
                                self.teacher_class =
                                    self.teacher_classes(school).first().cloned();
                            }
                        }
                    });
                if let Some(school) = self.teacher_school.clone() {
                    egui::ComboBox::from_label("Class")
                        .selected_text(self.teacher_class.clone().unwrap_or_default())
                        .show_ui(ui, |ui| {
                            for class in self.teacher_classes(&school) {
                                if ui
                                    .selectable_label(
                                        self.teacher_class.as_deref() == Some(&class),
                                        &class,
                                    )
                                    .clicked()
                                {
                                    self.teacher_class = Some(class.clone());
                                }
                            }
                        });
                }

                let docs = self.selected_class_docs();
                if !docs.is_empty() {
                    let now = Utc::now();
                    let rows = classroom::class_rows(&docs, now);
                    egui::ScrollArea::both().id_source("teacher_table").show(ui, |ui| {
                        egui::Grid::new("teacher_grid").striped(true).show(ui, |ui| {
                            for header in [
                                "Student", "Grade", "Units", "Bosses", "Fair mastery",
                                "Active 7d", "Last seen", "Difficulties", "Top error", "Flags",
                            ] {
                                ui.label(header);
                            }
                            ui.end_row();
                            for row in &rows {
                                ui.label(&row.first_name);
                                ui.label(content::grade_label(row.grade_year));
                                ui.label(format!(
                                    "{}/{}",
                                    row.units.units_passed, row.units.units_seen
                                ));
                                ui.label(format!(
                                    "{}/{}",
                                    row.units.bosses_passed, row.units.bosses_tried
                                ));
                                ui.label(format!(
                                    "{}{}",
                                    row.fair_mastery,
                                    if row.low_evidence { " (low evidence)" } else { "" }
                                ));
                                ui.label(row.weekly_active_days.to_string());
                                ui.label(
                                    row.last_active_at
                                        .map(|t| {
                                            t.with_timezone(&Local)
                                                .format("%d/%m %H:%M")
                                                .to_string()
                                        })
                                        .unwrap_or_else(|| "-".to_string()),
                                );
                                ui.label(
                                    row.top_difficulties
                                        .iter()
                                        .map(|d| format!("{} ({})", d.title, d.mastery))
                                        .collect::<Vec<_>>()
                                        .join("; "),
                                );
                                ui.label(
                                    row.top_error
                                        .as_ref()
                                        .map(|(c, n)| format!("{} ({})", c, n))
                                        .unwrap_or_else(|| "-".to_string()),
                                );
                                ui.label(row.inclusion_flags.join(" "));
                                ui.end_row();
                            }
                        });
                    });

                    ui.horizontal(|ui| {
                        if ui.button("Export CSV").clicked() {
                            action_csv = true;
                        }
                        if ui.button("Class report").clicked() {
                            action_report = true;
                        }
                    });
                }
            }

            ui.separator();
            ui.label("Paste a transfer code:");
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.teacher_code_input)
                        .desired_width(320.0),
                );
                if ui.button("Read code").clicked() {
                    action_read_code = true;
                }
            });

            if !self.teacher_report_text.is_empty() {
                ui.separator();
                ui.add(
                    egui::TextEdit::multiline(&mut self.teacher_report_text)
                        .desired_rows(12)
                        .desired_width(f32::INFINITY),
                );
            }

            if !self.status_line.is_empty() {
                ui.separator();
                ui.label(&self.status_line);
            }
        });

        if action_import {
            self.import_teacher_files();
        }
        if action_clear {
            if let Err(e) = db::clear_teacher_imports(&self.conn) {
                log::warn!("could not clear teacher imports: {}", e);
            }
            self.teacher_docs.clear();
            self.teacher_school = None;
            self.teacher_class = None;
            self.teacher_report_text.clear();
            self.toast("Teacher panel cleared.");
        }
        if action_csv {
            self.export_teacher_csv();
        }
        if action_report {
            let docs = self.selected_class_docs();
            let school = self.teacher_school.clone().unwrap_or_default();
            let class = self.teacher_class.clone().unwrap_or_default();
            self.teacher_report_text =
                classroom::class_report_text(&school, &class, &docs, Utc::now());
        }
        if action_read_code {
            match transfer_code::decode(&self.teacher_code_input) {
                Ok(card) => {
                    self.teacher_report_text = format!(
                        "Report card: {} ({} • {})\nQuestions: {} • Correct: {} • Accuracy: {}%\nXP: {} • Streak: {}\nTop errors: {}",
                        card.student_name,
                        card.class_group,
                        card.school,
                        card.summary.questions,
                        card.summary.correct,
                        card.summary.accuracy,
                        card.summary.xp_total,
                        card.summary.streak_current,
                        card.top_errors
                            .iter()
                            .map(|(c, n)| format!("{} ({})", c, n))
                            .collect::<Vec<_>>()
                            .join(", "),
                    );
                    self.toast("Code read.");
                }
                Err(e) => self.toast(format!("Could not read code: {}", e)),
            }
        }
    }

    fn export_teacher_csv(&mut self) {
        let docs = self.selected_class_docs();
        let (Some(school), Some(class)) = (self.teacher_school.clone(), self.teacher_class.clone())
        else {
            self.toast("Pick a school and class first.");
            return;
        };
        let rows = classroom::class_rows(&docs, Utc::now());
        let csv = classroom::csv_export(&school, &class, &rows);
        let filename = format!(
            "class_{}_{}_{}.csv",
            sanitize_file(&school),
            sanitize_file(&class),
            Local::now().format("%Y-%m-%d"),
        );
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(filename)
            .add_filter("CSV files", &["csv"])
            .save_file()
        {
            match std::fs::write(&path, csv) {
                Ok(()) => self.toast("CSV exported."),
                Err(e) => self.toast(format!("Export failed: {}", e)),
            }
        }
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        let mut changed = false;
        let mut action_reset = false;
        let mut action_delete = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Back").clicked() {
                    self.current_screen = AppScreen::Home;
                }
                ui.heading("Settings");
            });
            ui.separator();

            let Some(progress) = &mut self.progress else {
                ui.label("No active profile.");
                return;
            };
            changed |= ui
                .checkbox(&mut progress.settings.no_timer, "No timer")
                .changed();
            changed |= ui
                .checkbox(&mut progress.settings.reading_easy, "Easy reading")
                .changed();
            changed |= ui
                .checkbox(&mut progress.settings.focus_mode, "Focus mode (shorter sessions)")
                .changed();
            changed |= ui
                .checkbox(&mut progress.settings.reduce_motion, "Reduce motion")
                .changed();

            ui.separator();
            if ui.button("Reset progress").clicked() {
                action_reset = true;
            }
            if ui.button("Delete profile").clicked() {
                action_delete = true;
            }
        });

        if changed {
            self.save_progress();
        }
        if action_reset {
            let profile = self
                .progress
                .as_ref()
                .and_then(|p| self.profiles.iter().find(|x| x.profile_id == p.profile_id))
                .cloned();
            if let Some(profile) = profile {
                self.progress = Some(Progress::new_for_profile(&profile, Utc::now()));
                self.save_progress();
                self.toast("Progress reset.");
            }
        }
        if action_delete {
            if let Some(profile_id) = self.progress.as_ref().map(|p| p.profile_id.clone()) {
                if let Err(e) = db::delete_profile(&self.conn, &profile_id) {
                    log::warn!("could not delete profile {}: {}", profile_id, e);
                }
                self.profiles.retain(|p| p.profile_id != profile_id);
                self.progress = None;
                self.active_session = None;
                self.current_screen = AppScreen::Home;
                self.toast("Profile deleted.");
            }
        }
    }
}
