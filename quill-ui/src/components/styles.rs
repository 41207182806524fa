pub const QUILL_STYLES: &str = r#"
:root {
    /* Colors */
    --bg-abyss: #0b0a10;
    --bg-primary: #14121c;
    --bg-secondary: #1d1a28;
    --bg-raised: #262235;
    --text-primary: #ece6f5;
    --text-secondary: #a89fbd;
    --text-muted: #6f6785;
    --accent: #9b6bd8;
    --accent-hover: #b48ae6;
    --accent-text: #0b0a10;
    --gold: #d4af37;
    --border-color: #352f48;

    /* Semantic colors */
    --danger: #c0414b;
    --success: #3fa36b;
    --warning: #d8973c;
    --info: #5b7fd6;

    --radius: 10px;
    --font-display: "Cinzel", Georgia, serif;
    --font-body: "Crimson Text", Georgia, serif;
}

* { box-sizing: border-box; }

body {
    margin: 0;
    background: var(--bg-abyss);
    color: var(--text-primary);
    font-family: var(--font-body);
}

h1, h2, h3 { font-family: var(--font-display); margin: 0 0 0.5rem; }

input, textarea {
    width: 100%;
    padding: 0.6rem 0.75rem;
    margin-bottom: 0.75rem;
    background: var(--bg-primary);
    color: var(--text-primary);
    border: 1px solid var(--border-color);
    border-radius: var(--radius);
    font: inherit;
}
input:focus, textarea:focus { outline: none; border-color: var(--accent); }
label { display: block; color: var(--text-secondary); margin-bottom: 0.25rem; }

/* Buttons */
.primary-button {
    padding: 0.55rem 1.1rem;
    background: var(--accent);
    color: var(--accent-text);
    border: none;
    border-radius: var(--radius);
    font-family: var(--font-display);
    cursor: pointer;
}
.primary-button:hover { background: var(--accent-hover); }
.primary-button:disabled { opacity: 0.5; cursor: default; }
.ghost-button {
    padding: 0.4rem 0.8rem;
    background: transparent;
    color: var(--text-secondary);
    border: 1px solid var(--border-color);
    border-radius: var(--radius);
    cursor: pointer;
}
.ghost-button:hover { color: var(--text-primary); border-color: var(--accent); }
.ghost-button.danger:hover { color: var(--danger); border-color: var(--danger); }
.link-button {
    background: none;
    border: none;
    color: var(--accent);
    cursor: pointer;
    padding: 0;
    font: inherit;
}

/* Shell */
.app-layout { display: flex; min-height: 100vh; }
.sidebar {
    width: 240px;
    background: var(--bg-primary);
    border-right: 1px solid var(--border-color);
    padding: 1rem 0.75rem;
    transition: width 0.2s ease;
}
.sidebar.collapsed { width: 64px; }
.sidebar-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    margin-bottom: 1.5rem;
}
.brand { font-size: 1.2rem; color: var(--gold); }
.nav-item {
    display: flex;
    flex-direction: column;
    width: 100%;
    padding: 0.6rem 0.75rem;
    margin-bottom: 0.25rem;
    background: transparent;
    color: var(--text-secondary);
    border: none;
    border-radius: var(--radius);
    text-align: left;
    cursor: pointer;
}
.nav-item:hover { background: var(--bg-raised); color: var(--text-primary); }
.nav-item.active { background: var(--bg-raised); color: var(--accent-hover); }
.nav-name { font-family: var(--font-display); }
.nav-runic { font-size: 0.75rem; color: var(--text-muted); }
.nav-initial { font-family: var(--font-display); text-align: center; }
.app-main { flex: 1; display: flex; flex-direction: column; }
.app-header {
    display: flex;
    justify-content: flex-end;
    align-items: center;
    gap: 1rem;
    padding: 0.75rem 1.5rem;
    border-bottom: 1px solid var(--border-color);
}
.header-user { color: var(--text-secondary); }
.app-content { flex: 1; overflow-y: auto; }
.page-loading {
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    min-height: 60vh;
    color: var(--text-secondary);
    font-family: var(--font-display);
}

/* Auth */
.auth-page {
    display: flex;
    align-items: center;
    justify-content: center;
    min-height: 100vh;
    background: radial-gradient(circle at top, var(--bg-raised), var(--bg-abyss));
}
.auth-card {
    width: 100%;
    max-width: 420px;
    padding: 2rem;
    background: var(--bg-secondary);
    border: 1px solid var(--border-color);
    border-radius: var(--radius);
}
.auth-brand { font-family: var(--font-display); color: var(--gold); text-align: center; }
.auth-heading { text-align: center; }
.auth-subtitle { text-align: center; color: var(--text-secondary); margin-bottom: 1.5rem; }
.password-row { display: flex; gap: 0.5rem; align-items: flex-start; }
.field-error { color: var(--danger); font-size: 0.85rem; margin: -0.5rem 0 0.75rem; }
.form-error {
    padding: 0.6rem 0.75rem;
    margin-bottom: 0.75rem;
    border: 1px solid var(--danger);
    border-radius: var(--radius);
    color: var(--danger);
}
.form-notice {
    padding: 0.6rem 0.75rem;
    margin-bottom: 0.75rem;
    border: 1px solid var(--success);
    border-radius: var(--radius);
    color: var(--success);
}

/* Pages */
.page { padding: 2rem; }
.page-header {
    display: flex;
    justify-content: space-between;
    align-items: flex-start;
    margin-bottom: 1.5rem;
}
.page-subtitle { color: var(--text-secondary); margin: 0; }
.placeholder { text-align: center; padding-top: 6rem; }
.empty-state {
    text-align: center;
    padding: 4rem 1rem;
    color: var(--text-secondary);
    border: 1px dashed var(--border-color);
    border-radius: var(--radius);
}

/* Cards */
.card-grid {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(280px, 1fr));
    gap: 1rem;
}
.card {
    position: relative;
    padding: 1.25rem;
    background: var(--bg-secondary);
    border: 1px solid var(--border-color);
    border-radius: var(--radius);
}
.card.skeleton { min-height: 160px; animation: pulse 1.5s ease-in-out infinite; }
@keyframes pulse { 50% { opacity: 0.4; } }
.story-card { cursor: pointer; }
.story-card:hover { border-color: var(--accent); }
.card-title-row { display: flex; justify-content: space-between; gap: 0.5rem; }
.card-description { color: var(--text-secondary); }
.card-meta {
    display: flex;
    justify-content: space-between;
    color: var(--text-muted);
    font-size: 0.85rem;
}
.card-footer {
    display: flex;
    justify-content: space-between;
    align-items: center;
    gap: 0.5rem;
    margin-top: 1rem;
}
.genre-tag {
    padding: 0.15rem 0.5rem;
    border-radius: 999px;
    background: var(--bg-raised);
    color: var(--gold);
    font-size: 0.8rem;
}
.status-pill { padding: 0.15rem 0.5rem; border-radius: 999px; font-size: 0.75rem; }
.status-draft { background: var(--bg-raised); color: var(--text-secondary); }
.status-progress { background: var(--info); color: var(--text-primary); }
.status-completed { background: var(--success); color: var(--text-primary); }
.status-published { background: var(--gold); color: var(--accent-text); }

/* Goals */
.goal-dot {
    position: absolute;
    top: 1rem;
    right: 1rem;
    width: 10px;
    height: 10px;
    border-radius: 50%;
}
.goal-completed { background: var(--success); }
.goal-overdue { background: var(--danger); }
.goal-on-track { background: var(--info); }
.progress-labels {
    display: flex;
    justify-content: space-between;
    color: var(--text-secondary);
    font-size: 0.85rem;
}
.progress-track {
    height: 8px;
    margin: 0.35rem 0;
    background: var(--bg-primary);
    border-radius: 999px;
    overflow: hidden;
}
.progress-fill { height: 100%; background: var(--accent); }
.progress-fill.complete { background: var(--success); }
.progress-caption { color: var(--text-muted); font-size: 0.8rem; text-align: right; }
.goal-stats {
    display: grid;
    grid-template-columns: 1fr 1fr;
    gap: 0.5rem;
    margin-top: 0.75rem;
    text-align: center;
}
.stat-value { font-family: var(--font-display); font-size: 1.25rem; }
.stat-label { color: var(--text-muted); font-size: 0.75rem; }

/* Modals */
.modal-scrim {
    position: fixed;
    inset: 0;
    display: flex;
    align-items: center;
    justify-content: center;
    background: rgba(5, 4, 8, 0.75);
    z-index: 100;
}
.modal {
    width: 100%;
    max-width: 480px;
    padding: 1.5rem;
    background: var(--bg-secondary);
    border: 1px solid var(--border-color);
    border-radius: var(--radius);
}
.modal-actions { display: flex; justify-content: flex-end; gap: 0.5rem; }
.field-pair { display: grid; grid-template-columns: 1fr 1fr; gap: 0.75rem; }
.field-hint { color: var(--text-muted); font-size: 0.8rem; margin: -0.5rem 0 0.75rem; }

/* Editor */
.editor-page { display: flex; flex-direction: column; height: 100%; padding: 1.5rem 2rem; }
.editor-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    gap: 1rem;
    margin-bottom: 1rem;
}
.editor-title { display: flex; align-items: center; gap: 0.75rem; }
.editor-meta { display: flex; align-items: center; gap: 1rem; color: var(--text-secondary); }
.save-status { color: var(--text-muted); font-size: 0.85rem; }
.editor-toolbar {
    display: flex;
    flex-wrap: wrap;
    gap: 0.25rem;
    padding: 0.4rem;
    margin-bottom: 0.5rem;
    background: var(--bg-primary);
    border: 1px solid var(--border-color);
    border-radius: var(--radius);
}
.toolbar-button {
    min-width: 2.25rem;
    padding: 0.3rem 0.6rem;
    background: transparent;
    color: var(--text-secondary);
    border: none;
    border-radius: 6px;
    font-family: var(--font-display);
    cursor: pointer;
}
.toolbar-button:hover { background: var(--bg-raised); color: var(--text-primary); }
.editor-surface {
    flex: 1;
    min-height: 60vh;
    padding: 1.5rem;
    overflow-y: auto;
    background: var(--bg-primary);
    border: 1px solid var(--border-color);
    border-radius: var(--radius);
    font-size: 1.15rem;
    line-height: 1.7;
    outline: none;
}
.editor-surface:focus { border-color: var(--accent); }
.editor-surface:empty::before { content: attr(data-placeholder); color: var(--text-muted); }
.editor-surface blockquote {
    margin: 1rem 0;
    padding-left: 1rem;
    border-left: 3px solid var(--gold);
    color: var(--text-secondary);
    font-style: italic;
}
.editor-surface h1, .editor-surface h2, .editor-surface h3 { color: var(--gold); }
"#;
