//! Application state and event loop

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer, layout::Rect, style::Style, widgets::Widget, DefaultTerminal, Frame,
};

use crate::config::Config;
use crate::services::{to_csv, transform, Aggregator, Summarizer};
use crate::types::{
    BreakdownRow, CostRow, CostTrendPoint, CostsData, Kpis, MonthFilter, ProviderServices,
    ProviderTotal, TopProviders,
};

use super::theme::Theme;
use super::widgets::{
    help::HelpPopup,
    insights::{InsightsState, InsightsView},
    overview::{Overview, OverviewData},
    providers::{ProvidersData, ProvidersView},
    services::{ServicesData, ServicesView},
    spinner::{LoadingStage, Spinner},
    table::{TableData, TableView},
    tabs::Tab,
};

/// Application state
pub enum AppState {
    /// Loading data with spinner animation
    Loading {
        spinner_frame: usize,
        stage: LoadingStage,
    },
    /// Ready with loaded data
    Ready { data: Box<AppData> },
    /// Error state
    Error { message: String },
}

/// Progress sent by the loader thread
pub enum LoadMessage {
    Stage(LoadingStage),
    Done(Result<CostsData, String>),
}

/// Views derived from the dataset for the active month filter
#[derive(Debug, Clone)]
pub struct DashboardViews {
    pub kpis: Kpis,
    pub monthly_trend: Vec<(String, f64)>,
    pub provider_totals: Vec<ProviderTotal>,
    pub top_providers: TopProviders,
    pub services: Vec<ProviderServices>,
    pub cost_trend: Vec<CostTrendPoint>,
    pub breakdown: Vec<BreakdownRow>,
}

impl DashboardViews {
    pub fn build(costs: &CostsData, filter: &MonthFilter, top_n: usize) -> Self {
        let provider_totals = Aggregator::provider_totals(costs, filter);
        let top_providers = Aggregator::top_providers(&provider_totals, top_n);
        Self {
            kpis: Aggregator::kpis(costs, filter),
            monthly_trend: Aggregator::monthly_trend(costs),
            top_providers,
            provider_totals,
            services: Aggregator::services_by_provider(costs, filter),
            cost_trend: Aggregator::cost_trend(costs),
            breakdown: Aggregator::breakdown_table(costs),
        }
    }
}

/// Loaded application data
pub struct AppData {
    pub costs: CostsData,
    pub views: DashboardViews,
}

/// Main application
pub struct App {
    state: AppState,
    should_quit: bool,
    current_tab: Tab,
    filter: MonthFilter,
    /// Provider shown on the Services tab, kept by name across filter changes
    selected_provider: Option<String>,
    providers_scroll: usize,
    table_scroll: usize,
    services_scroll: usize,
    insights_scroll: u16,
    show_help: bool,
    insights: InsightsState,
    insights_rx: Option<Receiver<Result<String, String>>>,
    theme: Theme,
    config: Config,
}

impl App {
    /// Create a new app in loading state
    pub fn new(config: Config, theme: Theme) -> Self {
        Self {
            state: AppState::Loading {
                spinner_frame: 0,
                stage: LoadingStage::Fetching,
            },
            should_quit: false,
            current_tab: Tab::default(),
            filter: MonthFilter::All,
            selected_provider: None,
            providers_scroll: 0,
            table_scroll: 0,
            services_scroll: 0,
            insights_scroll: 0,
            show_help: false,
            insights: InsightsState::Idle,
            insights_rx: None,
            theme,
            config,
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.current_tab = self.current_tab.next();
            }
            KeyCode::BackTab => {
                self.current_tab = self.current_tab.prev();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_down();
            }
            KeyCode::Char(c @ '1'..='5') => {
                if let Some(tab) = Tab::from_number(c as u8 - b'0') {
                    self.current_tab = tab;
                }
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }
            KeyCode::Char('f') => self.cycle_filter(true),
            KeyCode::Char('F') => self.cycle_filter(false),
            KeyCode::Left | KeyCode::Char('h') if self.current_tab == Tab::Services => {
                self.cycle_provider(false);
            }
            KeyCode::Right | KeyCode::Char('l') if self.current_tab == Tab::Services => {
                self.cycle_provider(true);
            }
            KeyCode::Char('a') => self.request_insights(),
            _ => {}
        }
    }

    /// Filter choices: All, then every month in chronological order
    fn filter_options(&self) -> Vec<MonthFilter> {
        let mut options = vec![MonthFilter::All];
        if let AppState::Ready { data } = &self.state {
            options.extend(
                data.costs
                    .unique_months
                    .iter()
                    .map(|m| MonthFilter::Month(m.clone())),
            );
        }
        options
    }

    fn cycle_filter(&mut self, forward: bool) {
        let options = self.filter_options();
        if options.len() < 2 {
            return;
        }
        let current = options.iter().position(|f| *f == self.filter).unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        self.set_filter(options[next].clone());
    }

    /// Apply a month filter and rebuild the filtered views
    fn set_filter(&mut self, filter: MonthFilter) {
        tracing::debug!(filter = %filter, "month filter changed");
        self.filter = filter;
        self.services_scroll = 0;
        let top_n = self.config.top_n;
        if let AppState::Ready { data } = &mut self.state {
            data.views = DashboardViews::build(&data.costs, &self.filter, top_n);
        }
    }

    fn cycle_provider(&mut self, forward: bool) {
        let AppState::Ready { data } = &self.state else {
            return;
        };
        let services = &data.views.services;
        let count = services.len();
        if count == 0 {
            return;
        }
        let current = self.selected_index(services);
        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        self.selected_provider = Some(services[next].provider.clone());
        self.services_scroll = 0;
    }

    /// Index of the selected provider in the current breakdowns.
    /// Falls back to the first entry when the filter hides it.
    fn selected_index(&self, services: &[ProviderServices]) -> usize {
        self.selected_provider
            .as_deref()
            .and_then(|name| services.iter().position(|p| p.provider == name))
            .unwrap_or(0)
    }

    /// Rows the insights request covers under the current filter
    fn insight_rows(&self) -> Option<Vec<CostRow>> {
        match &self.state {
            AppState::Ready { data } => Some(
                Aggregator::filtered_details(&data.costs, &self.filter)
                    .into_iter()
                    .cloned()
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Start an insights request on a background thread
    fn request_insights(&mut self) {
        if self.insights.is_loading() {
            return;
        }
        let Some(rows) = self.insight_rows() else {
            return;
        };

        self.current_tab = Tab::Insights;
        self.insights_scroll = 0;
        self.insights = InsightsState::Loading {
            spinner_frame: 0,
            scope: self.filter.label().to_string(),
        };

        let config = self.config.clone();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let csv = to_csv(&rows);
            let result = config
                .summarizer()
                .and_then(|client| client.summarize(&csv))
                .map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
        self.insights_rx = Some(rx);
    }

    /// Check for a finished insights request (non-blocking)
    pub fn poll_insights(&mut self) {
        let Some(rx) = &self.insights_rx else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err("insights worker stopped without a response".to_string())
            }
        };
        self.insights_rx = None;

        let scope = match &self.insights {
            InsightsState::Loading { scope, .. } => scope.clone(),
            _ => self.filter.label().to_string(),
        };
        self.insights = match result {
            Ok(text) => InsightsState::Ready { text, scope },
            Err(message) => {
                tracing::warn!(error = %message, "insights request failed");
                InsightsState::Failed { message }
            }
        };
    }

    /// Apply a loader message to app state
    fn apply_load_message(&mut self, message: LoadMessage) {
        match message {
            LoadMessage::Stage(stage) => {
                if let AppState::Loading { spinner_frame, .. } = self.state {
                    self.state = AppState::Loading {
                        spinner_frame,
                        stage,
                    };
                }
            }
            LoadMessage::Done(Ok(costs)) => {
                let views = DashboardViews::build(&costs, &self.filter, self.config.top_n);
                self.state = AppState::Ready {
                    data: Box::new(AppData { costs, views }),
                };
            }
            LoadMessage::Done(Err(message)) => self.state = AppState::Error { message },
        }
    }

    /// Rows available for scrolling on the current tab
    fn scroll_limit(&self) -> usize {
        let AppState::Ready { data } = &self.state else {
            return 0;
        };
        match self.current_tab {
            Tab::Providers => data.views.cost_trend.len(),
            Tab::Table => data.views.breakdown.len(),
            Tab::Services => data
                .views
                .services
                .get(self.selected_index(&data.views.services))
                .map_or(0, |p| p.services.len()),
            Tab::Insights => match &self.insights {
                InsightsState::Ready { text, .. } => text.lines().count(),
                _ => 0,
            },
            Tab::Overview => 0,
        }
    }

    /// Scroll up in the current view
    fn scroll_up(&mut self) {
        match self.current_tab {
            Tab::Providers => self.providers_scroll = self.providers_scroll.saturating_sub(1),
            Tab::Table => self.table_scroll = self.table_scroll.saturating_sub(1),
            Tab::Services => self.services_scroll = self.services_scroll.saturating_sub(1),
            Tab::Insights => self.insights_scroll = self.insights_scroll.saturating_sub(1),
            Tab::Overview => {}
        }
    }

    /// Scroll down in the current view
    fn scroll_down(&mut self) {
        let max = self.scroll_limit().saturating_sub(1);
        match self.current_tab {
            Tab::Providers => self.providers_scroll = (self.providers_scroll + 1).min(max),
            Tab::Table => self.table_scroll = (self.table_scroll + 1).min(max),
            Tab::Services => self.services_scroll = (self.services_scroll + 1).min(max),
            Tab::Insights => {
                let max = u16::try_from(max).unwrap_or(u16::MAX);
                self.insights_scroll = self.insights_scroll.saturating_add(1).min(max);
            }
            Tab::Overview => {}
        }
    }

    /// Update spinner animations
    pub fn tick(&mut self) {
        if let AppState::Loading {
            spinner_frame,
            stage,
        } = &self.state
        {
            self.state = AppState::Loading {
                spinner_frame: Spinner::next_frame(*spinner_frame),
                stage: *stage,
            };
        }
        if let InsightsState::Loading {
            spinner_frame,
            scope,
        } = &self.insights
        {
            self.insights = InsightsState::Loading {
                spinner_frame: Spinner::next_frame(*spinner_frame),
                scope: scope.clone(),
            };
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match &self.state {
            AppState::Loading {
                spinner_frame,
                stage,
            } => {
                Spinner::new(*spinner_frame, *stage, self.theme).render(area, buf);
            }
            AppState::Ready { data } => {
                let views = &data.views;
                match self.current_tab {
                    Tab::Overview => {
                        let overview_data = OverviewData {
                            kpis: &views.kpis,
                            monthly_trend: &views.monthly_trend,
                            top_providers: &views.top_providers,
                            filter: &self.filter,
                        };
                        Overview::new(overview_data, self.theme)
                            .with_tab(self.current_tab)
                            .render(area, buf);
                    }
                    Tab::Providers => {
                        let providers_data = ProvidersData {
                            providers: &data.costs.unique_providers,
                            cost_trend: &views.cost_trend,
                            provider_totals: &views.provider_totals,
                            filter: &self.filter,
                        };
                        ProvidersView::new(providers_data, self.providers_scroll, self.theme)
                            .with_tab(self.current_tab)
                            .render(area, buf);
                    }
                    Tab::Table => {
                        let table_data = TableData {
                            months: &data.costs.unique_months,
                            rows: &views.breakdown,
                        };
                        TableView::new(table_data, self.table_scroll, self.theme)
                            .with_tab(self.current_tab)
                            .render(area, buf);
                    }
                    Tab::Services => {
                        let services_data = ServicesData {
                            breakdowns: &views.services,
                            selected: self.selected_index(&views.services),
                            filter: &self.filter,
                        };
                        ServicesView::new(services_data, self.services_scroll, self.theme)
                            .with_tab(self.current_tab)
                            .render(area, buf);
                    }
                    Tab::Insights => {
                        InsightsView::new(&self.insights, self.insights_scroll, self.theme)
                            .with_tab(self.current_tab)
                            .render(area, buf);
                    }
                }

                if self.show_help {
                    let popup_area = HelpPopup::centered_area(area);
                    HelpPopup::new(self.theme).render(popup_area, buf);
                }
            }
            AppState::Error { message } => {
                let y = area.y + area.height / 2;
                let text = format!("Error: {}", message);
                let x = area.x + (area.width.saturating_sub(text.chars().count() as u16)) / 2;
                buf.set_string(x, y, &text, Style::default().fg(self.theme.error()));
            }
        }
    }
}

/// Run the TUI application
pub fn run(config: Config) -> anyhow::Result<()> {
    // Detect before raw mode; the terminal query needs a cooked terminal
    let theme = Theme::detect();
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, config, theme);
    ratatui::restore();
    result
}

/// Fetch and transform on a background thread, reporting each stage
fn spawn_loader(config: Config) -> Receiver<LoadMessage> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = config.source().and_then(|source| {
            let rows = source.fetch()?;
            tracing::info!(source = source.name(), rows = rows.len(), "fetched cost rows");
            let _ = tx.send(LoadMessage::Stage(LoadingStage::Aggregating));
            Ok(transform(rows, Utc::now()))
        });
        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to load costs");
        }
        let _ = tx.send(LoadMessage::Done(result.map_err(|e| e.to_string())));
    });
    rx
}

fn run_app(terminal: &mut DefaultTerminal, config: Config, theme: Theme) -> anyhow::Result<()> {
    let data_rx = spawn_loader(config.clone());
    let mut app = App::new(config, theme);

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        if matches!(app.state, AppState::Loading { .. }) {
            while let Ok(message) = data_rx.try_recv() {
                app.apply_load_message(message);
            }
        }
        app.poll_insights();

        // Poll for events with 100ms timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn sample_costs() -> CostsData {
        let rows = vec![
            CostRow::new("Janeiro", "AWS", "EC2", 30.0),
            CostRow::new("Janeiro", "AWS", "S3", 10.0),
            CostRow::new("Janeiro", "AWS", "Total", 40.0),
            CostRow::new("Janeiro", "Heroku", "Dynos", 20.0),
            CostRow::new("Janeiro", "Heroku", "Total", 20.0),
            CostRow::new("Fevereiro", "AWS", "EC2", 50.0),
            CostRow::new("Fevereiro", "AWS", "Total", 50.0),
            CostRow::new("Fevereiro", "Heroku", "Dynos", 10.0),
            CostRow::new("Fevereiro", "Heroku", "Total", 10.0),
        ];
        transform(rows, Utc::now())
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Helper to create a ready app with sample data
    fn make_ready_app() -> App {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.apply_load_message(LoadMessage::Done(Ok(sample_costs())));
        app
    }

    #[test]
    fn test_app_initial_state() {
        let app = App::new(Config::default(), Theme::Dark);
        assert!(matches!(
            app.state,
            AppState::Loading {
                spinner_frame: 0,
                stage: LoadingStage::Fetching
            }
        ));
        assert!(!app.should_quit());
        assert_eq!(app.filter, MonthFilter::All);
    }

    #[test]
    fn test_app_quit_on_q() {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.handle_event(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn test_app_quit_on_esc() {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.handle_event(key(KeyCode::Esc));
        assert!(app.should_quit());
    }

    #[test]
    fn test_app_quit_on_ctrl_c() {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit());
    }

    #[test]
    fn test_app_tick_updates_spinner() {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.tick();
        assert!(matches!(
            app.state,
            AppState::Loading {
                spinner_frame: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_load_stage_message_keeps_frame() {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.tick();
        app.apply_load_message(LoadMessage::Stage(LoadingStage::Aggregating));
        assert!(matches!(
            app.state,
            AppState::Loading {
                spinner_frame: 1,
                stage: LoadingStage::Aggregating
            }
        ));
    }

    #[test]
    fn test_load_error_sets_error_state() {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.apply_load_message(LoadMessage::Done(Err("boom".into())));
        assert!(matches!(app.state, AppState::Error { ref message } if message == "boom"));
    }

    #[test]
    fn test_app_tab_navigation() {
        let mut app = App::new(Config::default(), Theme::Dark);
        assert_eq!(app.current_tab, Tab::Overview);

        app.handle_event(key(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Providers);

        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::BackTab,
            KeyModifiers::SHIFT,
        )));
        app.handle_event(Event::Key(KeyEvent::new(
            KeyCode::BackTab,
            KeyModifiers::SHIFT,
        )));
        assert_eq!(app.current_tab, Tab::Insights);
    }

    #[test]
    fn test_app_number_key_navigation() {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.handle_event(key(KeyCode::Char('4')));
        assert_eq!(app.current_tab, Tab::Services);
        app.handle_event(key(KeyCode::Char('3')));
        assert_eq!(app.current_tab, Tab::Table);
        app.handle_event(key(KeyCode::Char('1')));
        assert_eq!(app.current_tab, Tab::Overview);
    }

    #[test]
    fn test_app_help_toggle() {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.handle_event(key(KeyCode::Char('?')));
        assert!(app.show_help);
        app.handle_event(key(KeyCode::Char('?')));
        assert!(!app.show_help);
    }

    #[test]
    fn test_filter_cycles_through_months() {
        let mut app = make_ready_app();

        app.handle_event(key(KeyCode::Char('f')));
        assert_eq!(app.filter, MonthFilter::Month("Janeiro".into()));
        app.handle_event(key(KeyCode::Char('f')));
        assert_eq!(app.filter, MonthFilter::Month("Fevereiro".into()));
        app.handle_event(key(KeyCode::Char('f')));
        assert_eq!(app.filter, MonthFilter::All);

        app.handle_event(key(KeyCode::Char('F')));
        assert_eq!(app.filter, MonthFilter::Month("Fevereiro".into()));
    }

    #[test]
    fn test_filter_rebuilds_views() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Char('f')));

        let AppState::Ready { data } = &app.state else {
            panic!("expected ready state");
        };
        assert!((data.views.kpis.total_cost - 60.0).abs() < 1e-9);
        assert_eq!(data.views.provider_totals[0].provider, "AWS");
        assert!((data.views.provider_totals[0].total - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_filter_ignored_while_loading() {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.handle_event(key(KeyCode::Char('f')));
        assert_eq!(app.filter, MonthFilter::All);
    }

    #[test]
    fn test_provider_cycling_on_services_tab() {
        let mut app = make_ready_app();
        app.current_tab = Tab::Services;
        assert_eq!(app.selected_provider, None);

        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.selected_provider.as_deref(), Some("Heroku"));
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.selected_provider.as_deref(), Some("AWS"));
        app.handle_event(key(KeyCode::Left));
        assert_eq!(app.selected_provider.as_deref(), Some("Heroku"));
    }

    #[test]
    fn test_provider_keys_ignored_on_other_tabs() {
        let mut app = make_ready_app();
        app.current_tab = Tab::Overview;
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.selected_provider, None);
    }

    /// AWS has no services in Fevereiro, so the breakdown list shifts
    fn make_shifting_app() -> App {
        let rows = vec![
            CostRow::new("Janeiro", "AWS", "EC2", 30.0),
            CostRow::new("Janeiro", "AWS", "Total", 30.0),
            CostRow::new("Janeiro", "Heroku", "Dynos", 20.0),
            CostRow::new("Janeiro", "Heroku", "Total", 20.0),
            CostRow::new("Janeiro", "Github", "Actions", 5.0),
            CostRow::new("Janeiro", "Github", "Total", 5.0),
            CostRow::new("Fevereiro", "Heroku", "Dynos", 25.0),
            CostRow::new("Fevereiro", "Heroku", "Total", 25.0),
            CostRow::new("Fevereiro", "Github", "Actions", 7.0),
            CostRow::new("Fevereiro", "Github", "Total", 7.0),
        ];
        let mut app = App::new(Config::default(), Theme::Dark);
        app.apply_load_message(LoadMessage::Done(Ok(transform(rows, Utc::now()))));
        app.current_tab = Tab::Services;
        app
    }

    fn shown_provider(app: &App) -> Option<String> {
        let AppState::Ready { data } = &app.state else {
            return None;
        };
        data.views
            .services
            .get(app.selected_index(&data.views.services))
            .map(|p| p.provider.clone())
    }

    #[test]
    fn test_selected_provider_survives_filter_change() {
        let mut app = make_shifting_app();
        app.handle_event(key(KeyCode::Right));
        assert_eq!(shown_provider(&app).as_deref(), Some("Heroku"));

        app.set_filter(MonthFilter::Month("Fevereiro".into()));
        assert_eq!(shown_provider(&app).as_deref(), Some("Heroku"));

        app.handle_event(key(KeyCode::Right));
        assert_eq!(shown_provider(&app).as_deref(), Some("Github"));
    }

    #[test]
    fn test_hidden_provider_returns_when_filter_cleared() {
        let mut app = make_shifting_app();
        app.handle_event(key(KeyCode::Right));
        app.handle_event(key(KeyCode::Left));
        assert_eq!(shown_provider(&app).as_deref(), Some("AWS"));

        app.set_filter(MonthFilter::Month("Fevereiro".into()));
        assert_eq!(shown_provider(&app).as_deref(), Some("Heroku"));
        assert_eq!(app.selected_provider.as_deref(), Some("AWS"));

        app.set_filter(MonthFilter::All);
        assert_eq!(shown_provider(&app).as_deref(), Some("AWS"));
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut app = make_ready_app();
        app.current_tab = Tab::Table;

        for _ in 0..10 {
            app.handle_event(key(KeyCode::Down));
        }
        assert_eq!(app.table_scroll, 1);

        app.handle_event(key(KeyCode::Char('k')));
        app.handle_event(key(KeyCode::Char('k')));
        assert_eq!(app.table_scroll, 0);
    }

    #[test]
    fn test_insights_require_loaded_data() {
        let mut app = App::new(Config::default(), Theme::Dark);
        app.handle_event(key(KeyCode::Char('a')));
        assert_eq!(app.insights, InsightsState::Idle);
        assert!(app.insights_rx.is_none());
    }

    #[test]
    fn test_insight_rows_follow_filter() {
        let mut app = make_ready_app();
        assert_eq!(app.insight_rows().map(|r| r.len()), Some(5));

        app.handle_event(key(KeyCode::Char('f')));
        let rows = app.insight_rows().unwrap_or_default();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.month == "Janeiro"));
    }

    #[test]
    fn test_insights_without_key_fail() {
        let mut app = make_ready_app();
        app.handle_event(key(KeyCode::Char('a')));
        assert_eq!(app.current_tab, Tab::Insights);
        assert!(app.insights.is_loading());

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.insights.is_loading() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
            app.poll_insights();
        }

        assert!(matches!(app.insights, InsightsState::Failed { .. }));
        assert!(app.insights_rx.is_none());
    }

    #[test]
    fn test_insights_worker_disconnect_fails() {
        let mut app = make_ready_app();
        let (tx, rx) = mpsc::channel::<Result<String, String>>();
        drop(tx);
        app.insights = InsightsState::Loading {
            spinner_frame: 0,
            scope: "All months".into(),
        };
        app.insights_rx = Some(rx);

        app.poll_insights();

        assert!(matches!(app.insights, InsightsState::Failed { .. }));
        assert!(app.insights_rx.is_none());
    }

    #[test]
    fn test_insights_pending_stays_loading() {
        let mut app = make_ready_app();
        let (_tx, rx) = mpsc::channel::<Result<String, String>>();
        app.insights = InsightsState::Loading {
            spinner_frame: 0,
            scope: "All months".into(),
        };
        app.insights_rx = Some(rx);

        app.poll_insights();

        assert!(app.insights.is_loading());
        assert!(app.insights_rx.is_some());
    }

    #[test]
    fn test_render_ready_overview() {
        let app = make_ready_app();
        let area = Rect::new(0, 0, 120, 30);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(text.contains("$120.00"));
    }
}
