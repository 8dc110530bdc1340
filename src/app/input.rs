//! Key handling. Every key is read relative to the current mode; keys a
//! mode does not use are ignored.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::library::DisplayItem;

use super::editor::{EditorPhase, EditorTarget, PlaylistEditor};
use super::model::{App, Effect, Mode, short_title};

impl App {
    /// Interpret one key press.
    pub fn on_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Effect::Quit);
        }

        // Text entry swallows everything.
        if matches!(self.mode, Mode::Search) {
            return self.on_search_key(key.code);
        }
        if self
            .editor()
            .is_some_and(|e| e.phase == EditorPhase::EnteringName)
        {
            self.on_name_key(key.code);
            return None;
        }

        match key.code {
            KeyCode::Char('q') => return Some(Effect::Quit),
            KeyCode::Char('/') => {
                self.query.clear();
                self.mode = Mode::Search;
                return None;
            }
            KeyCode::Char('s') => {
                self.status = "Playback stopped".to_string();
                return Some(Effect::Stop);
            }
            KeyCode::Char(' ') if !matches!(self.mode, Mode::Editor(_)) => {
                return Some(Effect::TogglePause);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.show_volume();
                return Some(Effect::VolumeUp);
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                self.show_volume();
                return Some(Effect::VolumeDown);
            }
            KeyCode::Esc if !matches!(self.mode, Mode::Editor(_)) => {
                self.go_home();
                return None;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.viewport.up();
                return None;
            }
            _ => {}
        }

        match &self.mode {
            Mode::Home => self.on_home_key(key.code),
            Mode::Results => self.on_results_key(key.code),
            Mode::PlaylistView { .. } => self.on_playlist_view_key(key.code),
            Mode::Editor(_) => {
                self.on_selection_key(key.code);
                None
            }
            Mode::Search => None,
        }
    }

    fn move_down(&mut self) {
        let len = self.item_count();
        self.viewport.down(len);
    }

    /// Start a search for the typed query. A blank query does nothing.
    pub fn submit_search(&mut self) -> Option<Effect> {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            return None;
        }
        self.searching = true;
        self.status = "Searching...".to_string();
        let seq = self.next_search_seq();
        Some(Effect::Search {
            seq,
            query,
            limit: self.page_size(),
        })
    }

    fn on_search_key(&mut self, code: KeyCode) -> Option<Effect> {
        match code {
            KeyCode::Enter => self.submit_search(),
            KeyCode::Esc => {
                if self.results.is_empty() {
                    self.go_home();
                } else {
                    self.mode = Mode::Results;
                    self.viewport.clamp(self.results.len());
                    self.status = format!("Showing {} results", self.results.len());
                }
                None
            }
            KeyCode::Backspace => {
                self.query.pop();
                None
            }
            KeyCode::Char(c) if !c.is_control() => {
                self.query.push(c);
                None
            }
            _ => None,
        }
    }

    fn on_home_key(&mut self, code: KeyCode) -> Option<Effect> {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Enter => match self.selected_item()? {
                DisplayItem::Playlist(p) => {
                    self.status = format!("Playlist: {}", p.name);
                    self.enter_mode(Mode::PlaylistView { playlist_id: p.id });
                }
                DisplayItem::Track(t) => {
                    self.status = format!("Loading: {}...", short_title(&t.title));
                    return Some(Effect::Play(t));
                }
            },
            KeyCode::Char('f') | KeyCode::Char('F') => {
                if let Some(DisplayItem::Track(t)) = self.selected_item() {
                    if self.library.remove_favorite(&t.id) {
                        self.status =
                            format!("Removed from favorites: {}", short_title(&t.title));
                        let len = self.item_count();
                        self.viewport.clamp(len);
                    }
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => self.start_create(),
            _ => {}
        }
        None
    }

    fn on_results_key(&mut self, code: KeyCode) -> Option<Effect> {
        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.viewport.at_last(self.results.len()) {
                    if self.loading_more || self.results_query.is_empty() {
                        return None;
                    }
                    self.loading_more = true;
                    self.status = "Loading more results...".to_string();
                    return Some(Effect::FetchMore {
                        seq: self.current_search_seq(),
                        query: self.results_query.clone(),
                        already: self.fetched,
                        count: self.fetch_more_count(),
                    });
                }
                self.move_down();
            }
            KeyCode::Enter => {
                let track = self.results.get(self.viewport.selected)?.clone();
                self.status = format!("Loading: {}...", short_title(&track.title));
                return Some(Effect::Play(track));
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                let track = self.results.get(self.viewport.selected)?.clone();
                let title = short_title(&track.title);
                if self.library.remove_favorite(&track.id) {
                    self.status = format!("Removed from favorites: {title}");
                } else if self.library.add_favorite(track) {
                    self.status = format!("Added to favorites: {title}");
                }
            }
            _ => {}
        }
        None
    }

    fn on_playlist_view_key(&mut self, code: KeyCode) -> Option<Effect> {
        let Some(playlist) = self.viewed_playlist().cloned() else {
            self.go_home();
            return None;
        };
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Enter => {
                if self.viewport.selected < playlist.len() {
                    self.status = format!("Starting playlist: {}", playlist.name);
                    return Some(Effect::PlayPlaylist {
                        index: self.viewport.selected,
                        playlist,
                    });
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.status = format!("Editing playlist: {}", playlist.name);
                let editor = PlaylistEditor::edit(&playlist, self.library.favorites());
                self.enter_mode(Mode::Editor(editor));
            }
            _ => {}
        }
        None
    }

    fn start_create(&mut self) {
        if self.library.favorites().is_empty() {
            self.status = "Add some favorites first before creating a playlist!".to_string();
            return;
        }
        self.status = "Name the new playlist".to_string();
        let editor = PlaylistEditor::create(self.library.favorites());
        self.enter_mode(Mode::Editor(editor));
    }

    fn on_name_key(&mut self, code: KeyCode) {
        let Mode::Editor(editor) = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Enter => {
                if editor.confirm_name() {
                    self.status = "Space to pick tracks, Enter to save".to_string();
                    self.viewport.reset();
                }
            }
            KeyCode::Esc => {
                self.go_home();
                self.status = "Playlist creation cancelled".to_string();
            }
            KeyCode::Backspace => {
                editor.name.pop();
            }
            KeyCode::Char(c) if !c.is_control() => editor.name.push(c),
            _ => {}
        }
    }

    fn on_selection_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Char(' ') => {
                let index = self.viewport.selected;
                if let Mode::Editor(editor) = &mut self.mode {
                    editor.toggle(index);
                }
            }
            KeyCode::Enter => self.save_editor(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.delete_edited_playlist(),
            KeyCode::Esc => self.cancel_editor(),
            _ => {}
        }
    }

    fn save_editor(&mut self) {
        let Some(editor) = self.editor().cloned() else {
            return;
        };
        if editor.selected.is_empty() {
            self.status = "Select at least one track!".to_string();
            return;
        }
        let name = editor.name.trim().to_string();

        match editor.target {
            EditorTarget::Create => {
                if self.library.create_playlist(&name, editor.selected).is_some() {
                    self.go_home();
                    self.status = format!("Created playlist: {name}");
                }
            }
            EditorTarget::Edit { playlist_id } => {
                if self
                    .library
                    .update_playlist(&playlist_id, &name, editor.selected)
                {
                    self.enter_mode(Mode::PlaylistView { playlist_id });
                    self.status = format!("Updated playlist: {name}");
                }
            }
        }
    }

    fn delete_edited_playlist(&mut self) {
        let Some(EditorTarget::Edit { playlist_id }) = self.editor().map(|e| e.target.clone())
        else {
            return;
        };
        let name = self
            .library
            .playlist(&playlist_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        if self.library.delete_playlist(&playlist_id) {
            self.go_home();
            self.status = format!("Deleted playlist: {name}");
        }
    }

    fn cancel_editor(&mut self) {
        match self.editor().map(|e| e.target.clone()) {
            Some(EditorTarget::Edit { playlist_id }) => {
                self.enter_mode(Mode::PlaylistView { playlist_id });
                self.status = "Editing cancelled".to_string();
            }
            _ => {
                self.go_home();
                self.status = "Playlist creation cancelled".to_string();
            }
        }
    }
}
