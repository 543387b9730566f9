use crate::api::{AssetSource, BackendClient};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::message::Message;
use crate::model::report::REPORT_PATH;
use crate::model::{chat_client_name, find_patient, Route, SliceCursor, PATIENTS};
use crate::screen::{
    ChatState, MriState, PatientListState, PendingAction, ReportState, Screen,
};
use crate::views::chat_view::TRANSCRIPT_ID;
use crate::views::{chat_view, mri_viewer, patient_list, report_viewer};
use iced::theme::Palette;
use iced::widget::scrollable;
use iced::{application, Color, Element, Task, Theme};
use rfd::AsyncFileDialog;
use std::path::PathBuf;

const APP_TITLE: &str = "GemmARIA";

pub fn run() -> iced::Result {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    let _ = env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .format_timestamp_secs()
        .try_init();

    if let Some(err) = config_error {
        log::error!("Ignoring invalid configuration, using defaults: {err}");
    }

    let route = std::env::args()
        .nth(1)
        .map(|arg| Route::parse(&arg))
        .unwrap_or_default();

    let app = match App::new(config) {
        Ok(app) => app,
        Err(err) => {
            log::error!("Invalid backend or asset location: {err}");
            std::process::exit(1);
        }
    };

    application(App::title, App::update, App::view)
        .theme(App::theme)
        .run_with(move || {
            let mut app = app;
            let task = app.navigate(route);
            (app, task)
        })
}

pub struct App {
    config: AppConfig,
    backend: BackendClient,
    assets: AssetSource,
    theme: Theme,
    screen: Screen,
    chat_sessions: u64,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let backend = BackendClient::new(&config.backend_url)?;
        let assets = AssetSource::from_root(&config.asset_root)?;
        log::info!(
            "Backend at {}, assets from {}",
            backend.base_url(),
            config.asset_root
        );
        Ok(Self {
            config,
            backend,
            assets,
            theme: gemmaria_theme(),
            screen: Screen::PatientList(PatientListState::default()),
            chat_sessions: 0,
        })
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn navigate(&mut self, route: Route) -> Task<Message> {
        log::info!("Navigating to {route}");
        match route {
            Route::PatientList => {
                self.screen = Screen::PatientList(PatientListState::default());
                Task::none()
            }
            Route::Mri { patient } => {
                let cursor = SliceCursor::new(self.config.initial_slice, self.config.total_slices);
                self.screen = Screen::Mri(MriState::new(&patient, cursor));
                self.prefetch_slices()
            }
            Route::Report {
                patient,
                client_name,
            } => {
                let client_name = client_name
                    .or_else(|| find_patient(&patient).map(|p| p.name.to_string()))
                    .unwrap_or_else(|| patient.clone());
                self.screen = Screen::Report(ReportState::new(patient, client_name));
                let assets = self.assets.clone();
                Task::perform(
                    async move {
                        assets
                            .fetch_text(REPORT_PATH)
                            .await
                            .map_err(|err| err.to_string())
                    },
                    Message::ReportLoaded,
                )
            }
            Route::Chat {
                patient,
                client_name,
            } => {
                let name = chat_client_name(&patient, client_name.as_deref());
                self.chat_sessions += 1;
                let session = self.chat_sessions;
                self.screen = Screen::Chat(ChatState::new(session, name.clone()));
                let backend = self.backend.clone();
                Task::perform(
                    async move {
                        backend
                            .start_chat(&name)
                            .await
                            .map_err(|err| err.to_string())
                    },
                    move |result| Message::ChatStarted { session, result },
                )
            }
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(route) => self.navigate(route),

            Message::TogglePatient(patient) => {
                if let Screen::PatientList(list) = &mut self.screen {
                    list.toggle(patient);
                }
                Task::none()
            }
            Message::OpenMri(patient) => {
                if !self.begin_pending(PendingAction::Segmentation) {
                    return Task::none();
                }
                let backend = self.backend.clone();
                Task::perform(
                    async move {
                        backend
                            .run_segmentation()
                            .await
                            .map_err(|err| err.to_string())
                    },
                    move |result| Message::SegmentationFinished { patient, result },
                )
            }
            Message::SegmentationFinished { patient, result } => {
                if !self.end_pending() {
                    return Task::none();
                }
                match (result, find_patient(patient)) {
                    (Ok(()), Some(found)) => self.navigate(Route::Mri {
                        patient: found.mri_slug(),
                    }),
                    (Ok(()), None) => {
                        log::warn!("Segmentation finished for unknown patient {patient}");
                        Task::none()
                    }
                    (Err(err), _) => {
                        log::error!("Error processing MRI: {err}");
                        Task::none()
                    }
                }
            }
            Message::OpenReport(patient) => {
                let Some(found) = find_patient(patient) else {
                    return Task::none();
                };
                if !self.begin_pending(PendingAction::Report) {
                    return Task::none();
                }
                let backend = self.backend.clone();
                let name = found.name;
                Task::perform(
                    async move {
                        backend
                            .generate_report(name)
                            .await
                            .map_err(|err| err.to_string())
                    },
                    move |result| Message::ReportGenerated { patient, result },
                )
            }
            Message::ReportGenerated { patient, result } => {
                if !self.end_pending() {
                    return Task::none();
                }
                match result {
                    Ok(()) => self.navigate(Route::Report {
                        patient: patient.to_string(),
                        client_name: find_patient(patient).map(|p| p.name.to_string()),
                    }),
                    Err(err) => {
                        log::error!("Error generating report: {err}");
                        Task::none()
                    }
                }
            }

            Message::SliceChanged(index) => self.move_cursor(|cursor| cursor.set(index)),
            Message::PreviousSlice => self.move_cursor(SliceCursor::previous),
            Message::NextSlice => self.move_cursor(SliceCursor::next),
            Message::ToggleSegmentation => {
                if let Screen::Mri(mri) = &mut self.screen {
                    mri.overlay = mri.overlay.toggle_segmentation();
                }
                self.prefetch_slices()
            }
            Message::ToggleProgression => {
                if let Screen::Mri(mri) = &mut self.screen {
                    mri.overlay = mri.overlay.toggle_progression();
                }
                self.prefetch_slices()
            }
            Message::SliceLoaded { path, result } => {
                if let Screen::Mri(mri) = &mut self.screen {
                    mri.cache.complete(path, result);
                    log::debug!("{} slice images cached", mri.cache.len());
                }
                Task::none()
            }

            Message::ReportLoaded(result) => {
                let Screen::Report(report) = &mut self.screen else {
                    return Task::none();
                };
                report.loaded(result);
                let tasks: Vec<_> = report
                    .request_images()
                    .into_iter()
                    .map(|path| {
                        let assets = self.assets.clone();
                        Task::perform(
                            async move {
                                let result = assets
                                    .fetch_bytes(&path)
                                    .await
                                    .map_err(|err| err.to_string());
                                (path, result)
                            },
                            |(path, result)| Message::ReportImageLoaded { path, result },
                        )
                    })
                    .collect();
                Task::batch(tasks)
            }
            Message::ReportImageLoaded { path, result } => {
                if let Screen::Report(report) = &mut self.screen {
                    // Only images this visit asked for.
                    if report.images.is_loading(&path) {
                        report.images.complete(path, result);
                    }
                }
                Task::none()
            }
            Message::DownloadReport => {
                let Screen::Report(report) = &mut self.screen else {
                    return Task::none();
                };
                let Some(html) = report.html.clone() else {
                    return Task::none();
                };
                if report.saving {
                    return Task::none();
                }
                report.saving = true;
                report.notice = None;
                let file_name = report.download_file_name();
                Task::perform(save_report(file_name, html), Message::ReportSaved)
            }
            Message::ReportSaved(result) => {
                if let Screen::Report(report) = &mut self.screen {
                    report.saving = false;
                    report.notice = match result {
                        Ok(Some(path)) => {
                            log::info!("Report saved to {}", path.display());
                            Some(format!("Saved to {}", path.display()))
                        }
                        Ok(None) => None,
                        Err(err) => {
                            log::error!("Error downloading report: {err}");
                            Some(format!("Could not save the report: {err}"))
                        }
                    };
                }
                Task::none()
            }

            Message::ChatStarted { session, result } => {
                let Some(chat) = self.chat_session(session) else {
                    log::warn!("Dropping chat history from an earlier session");
                    return Task::none();
                };
                chat.session.started(result);
                chat.sync_rendered();
                snap_transcript()
            }
            Message::ChatInputChanged(input) => {
                if let Screen::Chat(chat) = &mut self.screen {
                    chat.input = input;
                }
                Task::none()
            }
            Message::SendChat => {
                let Screen::Chat(chat) = &mut self.screen else {
                    return Task::none();
                };
                let Some(outgoing) = chat.session.begin_send(&chat.input) else {
                    return Task::none();
                };
                chat.input.clear();
                chat.sync_rendered();
                let session = chat.id;
                let backend = self.backend.clone();
                Task::batch([
                    snap_transcript(),
                    Task::perform(
                        async move {
                            backend
                                .send_chat(&outgoing)
                                .await
                                .map_err(|err| err.to_string())
                        },
                        move |result| Message::ChatReplied { session, result },
                    ),
                ])
            }
            Message::ChatReplied { session, result } => {
                let Some(chat) = self.chat_session(session) else {
                    log::warn!("Dropping chat reply from an earlier session");
                    return Task::none();
                };
                chat.session.replied(result);
                chat.sync_rendered();
                snap_transcript()
            }
            Message::LinkClicked(url) => {
                log::info!("Link clicked in chat: {url}");
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        match &self.screen {
            Screen::PatientList(state) => patient_list(PATIENTS, state),
            Screen::Mri(state) => mri_viewer(state),
            Screen::Report(state) => report_viewer(state),
            Screen::Chat(state) => chat_view(state, &self.theme),
        }
    }

    pub fn title(&self) -> String {
        match &self.screen {
            Screen::PatientList(_) => APP_TITLE.to_string(),
            Screen::Mri(state) => format!("{APP_TITLE} · MRI · {}", state.patient_name),
            Screen::Report(state) => format!("{APP_TITLE} · Report · {}", state.client_name),
            Screen::Chat(state) => {
                format!("{APP_TITLE} · Chat · {}", state.session.client_name())
            }
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme.clone()
    }

    fn chat_session(&mut self, session: u64) -> Option<&mut ChatState> {
        match &mut self.screen {
            Screen::Chat(chat) if chat.id == session => Some(chat),
            _ => None,
        }
    }

    /// Returns `false` if another backend call is already outstanding.
    fn begin_pending(&mut self, action: PendingAction) -> bool {
        match &mut self.screen {
            Screen::PatientList(list) if list.pending.is_none() => {
                list.pending = Some(action);
                true
            }
            _ => false,
        }
    }

    /// Clears the loading flag. Returns `false` if the user is no longer on
    /// the patient list, in which case the result is dropped.
    fn end_pending(&mut self) -> bool {
        match &mut self.screen {
            Screen::PatientList(list) => {
                list.pending = None;
                true
            }
            _ => false,
        }
    }

    fn move_cursor(&mut self, step: impl FnOnce(&mut SliceCursor)) -> Task<Message> {
        let Screen::Mri(mri) = &mut self.screen else {
            return Task::none();
        };
        let before = mri.cursor.index();
        step(&mut mri.cursor);
        if mri.cursor.index() == before {
            return Task::none();
        }
        self.prefetch_slices()
    }

    /// Requests every image in the window around the current slice that is
    /// neither cached nor already in flight. Nothing is cancelled.
    fn prefetch_slices(&mut self) -> Task<Message> {
        let Screen::Mri(mri) = &mut self.screen else {
            return Task::none();
        };
        let tasks: Vec<_> = mri
            .prefetch_paths(self.config.prefetch_radius)
            .into_iter()
            .filter(|path| mri.cache.request(path))
            .map(|path| {
                let assets = self.assets.clone();
                log::trace!("Prefetching {}", assets.describe(&path));
                Task::perform(
                    async move {
                        let result = assets
                            .fetch_bytes(&path)
                            .await
                            .map_err(|err| err.to_string());
                        (path, result)
                    },
                    |(path, result)| Message::SliceLoaded { path, result },
                )
            })
            .collect();
        Task::batch(tasks)
    }
}

fn gemmaria_theme() -> Theme {
    Theme::custom(
        APP_TITLE.to_string(),
        Palette {
            background: Color::from_rgb8(0x18, 0x10, 0x28),
            text: Color::from_rgb8(0xE0, 0xD7, 0xF7),
            primary: Color::from_rgb8(0xA2, 0x59, 0xF7),
            success: Color::from_rgb8(0x2E, 0xCC, 0x71),
            danger: Color::from_rgb8(0xF7, 0x6B, 0x1C),
        },
    )
}

fn snap_transcript() -> Task<Message> {
    scrollable::snap_to(
        scrollable::Id::new(TRANSCRIPT_ID),
        scrollable::RelativeOffset::END,
    )
}

async fn save_report(file_name: String, html: String) -> Result<Option<PathBuf>, String> {
    let Some(handle) = AsyncFileDialog::new()
        .set_file_name(file_name)
        .add_filter("HTML", &["html"])
        .save_file()
        .await
    else {
        return Ok(None);
    };
    let path = handle.path().to_path_buf();
    tokio::fs::write(&path, html)
        .await
        .map_err(|err| format!("{}: {err}", path.display()))?;
    Ok(Some(path))
}
