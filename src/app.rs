use crate::event::AppEvent;
use crate::explainer::ExplainerClient;
use crate::models::loan::Decision;
use crate::models::{format_usd, LoanDecision, OfferRecommendation};
use crate::session::{Effect, Role, SessionState, REVIEWERS};
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub struct MetaAiApp {
    rx: Receiver<AppEvent>,
    explainer: ExplainerClient,
    session: SessionState,
    input_buffer: String,
    /// One request may be outstanding at a time; the composer and the
    /// generator buttons stay disabled until its event arrives.
    awaiting_reply: bool,
    notice: Option<String>,
    diagnostics_log: Vec<String>,
    theme: Theme,
    scroll_to_bottom: bool,
}

impl MetaAiApp {
    pub fn new(rx: Receiver<AppEvent>, explainer: ExplainerClient) -> Self {
        Self {
            rx,
            explainer,
            session: SessionState::new(),
            input_buffer: String::new(),
            awaiting_reply: false,
            notice: None,
            diagnostics_log: Vec::new(),
            theme: Theme::default(),
            scroll_to_bottom: false,
        }
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, Some(ctx)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: Option<&egui::Context>) {
        match event {
            AppEvent::ExplanationReady(text) | AppEvent::AssistantReply(text) => {
                self.session.push_assistant(text);
                self.awaiting_reply = false;
                self.scroll_to_bottom = true;
            }
            AppEvent::RequestFailed(message) => {
                self.log_diagnostic(format!("completion request failed: {message}"));
                self.notice = Some(format!("Error: {message}"));
                self.awaiting_reply = false;
            }
        }

        if let Some(ctx) = ctx {
            ctx.request_repaint();
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ExplainLoan(decision) => self.explainer.explain_loan(&decision),
            Effect::ExplainOffer(recommendation) => self.explainer.explain_offer(&recommendation),
            Effect::CompleteChat(transcript) => self.explainer.reply(&transcript),
        }
        self.awaiting_reply = true;
    }

    fn submit_message(&mut self, ctx: &egui::Context) {
        let text = self.input_buffer.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.notice = None;
        let effect = self.session.submit(&text);
        self.input_buffer.clear();
        self.scroll_to_bottom = true;

        if let Some(effect) = effect {
            self.run_effect(effect);
        }
        ctx.request_repaint();
    }

    fn clear_chat(&mut self, ctx: &egui::Context) {
        self.session.clear_transcript();
        self.notice = None;
        self.log_diagnostic("transcript cleared");
        self.scroll_to_bottom = true;
        ctx.request_repaint();
    }

    fn generate_loan(&mut self, ctx: &egui::Context) {
        let decision = LoanDecision::generate(&mut rand::thread_rng());
        self.log_diagnostic(format!(
            "loan decision generated for {} ({})",
            decision.applicant_id, decision.decision
        ));
        self.notice = None;
        self.scroll_to_bottom = true;

        let effect = self.session.record_loan(decision);
        self.run_effect(effect);
        ctx.request_repaint();
    }

    fn generate_offer(&mut self, ctx: &egui::Context) {
        let recommendation = OfferRecommendation::generate(&mut rand::thread_rng());
        self.log_diagnostic(format!(
            "offers recommended for {}: {}",
            recommendation.profile.customer_id,
            recommendation.offers.join(", ")
        ));
        self.notice = None;
        self.scroll_to_bottom = true;

        let effect = self.session.record_offer(recommendation);
        self.run_effect(effect);
        ctx.request_repaint();
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("MetaAI");
                ui.separator();
                ui.label(
                    RichText::new("Explainable AI for confident decisions")
                        .color(self.theme.text_muted),
                );
                ui.separator();
                if self.awaiting_reply {
                    ui.label(
                        RichText::new("Waiting for MetaAI...").color(self.theme.accent_primary),
                    );
                } else {
                    ui.label(RichText::new("Ready").color(self.theme.success));
                }
            });
        });
    }

    fn render_left_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("predictions_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("ML Predictions");
                ui.label(
                    RichText::new("Generate a synthetic model output to have it explained.")
                        .color(self.theme.text_muted),
                );
                ui.separator();

                let idle = !self.awaiting_reply;
                if ui
                    .add_enabled(idle, egui::Button::new("Loan Decision Model"))
                    .clicked()
                {
                    self.generate_loan(ctx);
                }
                if ui
                    .add_enabled(idle, egui::Button::new("Offer Recommendation Model"))
                    .clicked()
                {
                    self.generate_offer(ctx);
                }

                if let Some(decision) = self.session.latest_loan() {
                    ui.add_space(self.theme.spacing_8);
                    self.theme.card_frame().show(ui, |ui| {
                        ui.label(RichText::new("Latest Loan Decision").strong());
                        ui.add_space(self.theme.spacing_4);
                        ui.label(format!("Applicant ID: {}", decision.applicant_id));
                        ui.label(format!(
                            "Demographics: Age {}, Gender {}, Income {}",
                            decision.age,
                            decision.gender,
                            format_usd(decision.income)
                        ));
                        ui.label(format!("Credit Score: {}", decision.credit_score));
                        ui.label(format!("Past Payment Issues: {}", decision.past_issues));
                        ui.label(format!("Risk Factor: {}", decision.risk));

                        let color = match decision.decision {
                            Decision::Approved => self.theme.success,
                            Decision::Rejected => self.theme.danger,
                        };
                        ui.label(
                            RichText::new(format!("Decision: {}", decision.decision))
                                .color(color)
                                .strong(),
                        );
                    });
                }

                if let Some(recommendation) = self.session.latest_offer() {
                    ui.add_space(self.theme.spacing_8);
                    self.theme.card_frame().show(ui, |ui| {
                        ui.label(RichText::new("Latest Offer Recommendation").strong());
                        ui.add_space(self.theme.spacing_4);
                        let profile = &recommendation.profile;
                        ui.label(format!("Customer ID: {}", profile.customer_id));
                        ui.label(format!(
                            "Demographics: Age {}, Gender {}, Income {}",
                            profile.age,
                            profile.gender,
                            format_usd(profile.income)
                        ));
                        ui.label(format!(
                            "Existing Products: {}",
                            profile.existing_products.join(", ")
                        ));
                        ui.label(format!(
                            "Spend Pattern: {} ({} annual)",
                            profile.spend.category,
                            format_usd(profile.spend.annual_spend)
                        ));
                        ui.label(
                            RichText::new(format!(
                                "Recommended Offers: {}",
                                recommendation.offers.join(", ")
                            ))
                            .color(self.theme.accent_primary),
                        );
                    });
                }
            });
    }

    fn render_right_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("validation_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Validation Panel");
                ui.separator();

                // Invite buttons render only while the reviewer is absent.
                let mut invite = None;
                if self.session.can_invite(REVIEWERS[0])
                    && ui.button("Invite for Peer Validation").clicked()
                {
                    invite = Some(REVIEWERS[0]);
                }
                if self.session.can_invite(REVIEWERS[1])
                    && ui.button("Invite for Manager Validation").clicked()
                {
                    invite = Some(REVIEWERS[1]);
                }
                if let Some(name) = invite {
                    if self.session.invite(name) {
                        self.log_diagnostic(format!("{name} invited for validation"));
                        self.scroll_to_bottom = true;
                    }
                }

                if self.session.has_invited_reviewers() {
                    ui.separator();
                    let mut selected = self.session.active_participant().to_string();
                    egui::ComboBox::from_label("Active User")
                        .selected_text(selected.clone())
                        .show_ui(ui, |ui| {
                            for option in self.session.participant_options() {
                                ui.selectable_value(&mut selected, option.clone(), option);
                            }
                        });
                    if selected != self.session.active_participant() {
                        self.session.set_active_participant(&selected);
                        self.log_diagnostic(format!("active participant set to {selected}"));
                    }
                }
            });
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Chat");
            ui.separator();

            if let Some(notice) = &self.notice {
                ui.label(RichText::new(notice).color(self.theme.danger));
                ui.separator();
            }

            let transcript_height = (ui.available_height() - 190.0).max(120.0);
            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .max_height(transcript_height)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for message in self.session.messages() {
                        // The leading system prompt is context, not transcript.
                        let (layout, fill) = match message.role {
                            Role::System => continue,
                            Role::User => (
                                egui::Layout::top_down(egui::Align::Max),
                                self.theme.user_bubble,
                            ),
                            Role::Assistant => (
                                egui::Layout::top_down(egui::Align::Min),
                                self.theme.assistant_bubble,
                            ),
                        };

                        ui.with_layout(layout, |ui| {
                            self.theme.bubble_frame(fill).show(ui, |ui| {
                                ui.set_max_width(ui.available_width() * 0.75);
                                ui.label(&message.content);
                            });
                        });
                        ui.add_space(self.theme.spacing_4);
                    }

                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;

            ui.separator();
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(entry);
                            }
                        });
                });

            ui.separator();
            let input_enabled = !self.awaiting_reply;
            let hint = if self.awaiting_reply {
                "Waiting for response...".to_string()
            } else {
                format!(
                    "{}, ask a question about the latest decision or model output...",
                    self.session.active_participant()
                )
            };

            let mut send_now = false;
            let mut clear_now = false;
            self.theme.composer_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    let input_width = (ui.available_width() - 200.0).max(120.0);
                    let response = ui.add_enabled(
                        input_enabled,
                        egui::TextEdit::singleline(&mut self.input_buffer)
                            .desired_width(input_width)
                            .hint_text(hint),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        send_now = true;
                    }

                    let send_clicked = ui
                        .add_enabled(
                            input_enabled && !self.input_buffer.trim().is_empty(),
                            egui::Button::new("Send"),
                        )
                        .clicked();
                    send_now |= send_clicked;
                    clear_now = ui.button("Clear Chat").clicked();
                });
            });

            if send_now && input_enabled {
                self.submit_message(ctx);
            }
            if clear_now {
                self.clear_chat(ctx);
            }
        });
    }
}

impl eframe::App for MetaAiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        if self.awaiting_reply {
            // Keep frames coming while a request is in flight so its event is
            // applied promptly.
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        self.render_top_bar(ctx);
        self.render_left_panel(ctx);
        self.render_right_panel(ctx);
        self.render_center_panel(ctx);
    }
}
