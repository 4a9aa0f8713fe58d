//! Página contenedora servida en todas las rutas del panel.
//!
//! Pinta las regiones que llegan por `/ws/views` y reenvía clics y
//! formularios a `/api/actions/...`. Todo el estado vive en el servidor.

pub const PAGE_SHELL: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Surveillance Dashboard</title>
<link rel="stylesheet" href="/style.css">
<style>
body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 0; }
nav { display: flex; gap: 12px; padding: 8px 16px; border-bottom: 1px solid #ccc; }
main { display: grid; grid-template-columns: repeat(auto-fill, minmax(320px, 1fr)); gap: 16px; padding: 16px; }
.region:empty { display: none; }
.bounding-box { position: absolute; border: 2px solid; }
.bounding-box.known { border-color: #3fb950; }
.bounding-box.unknown { border-color: #f85149; }
.custom-modal { position: fixed; inset: 0; background: rgba(0,0,0,.4); display: flex; align-items: center; justify-content: center; }
.modal-content { background: #fff; padding: 16px; border-radius: 8px; min-width: 280px; }
.message { transition: opacity .5s; }
</style>
</head>
<body>
<div id="region-chrome" class="region"></div>
<nav>
  <a href="/admin_overview" data-nav>Overview</a>
  <a href="/admin_alerts" data-nav>Alerts</a>
  <a href="/admin_camera_management" data-nav>Cameras</a>
  <a href="/admin_threat_config" data-nav>Threat</a>
  <a href="/admin_activity_log" data-nav>Activity</a>
  <a href="/admin_settings" data-nav>Settings</a>
  <a href="/personnel_overview" data-nav>Personnel</a>
  <a href="/personnel_alerts" data-nav>My Alerts</a>
  <a href="/personnel_settings" data-nav>My Settings</a>
  <button id="logout-button">Logout</button>
  <span id="region-clock" class="region"></span>
  <span id="region-health_indicator" class="region"></span>
</nav>
<main id="page"></main>
<form id="add-camera-form" hidden>
  <input id="camera-name" placeholder="Camera name">
  <input id="rtsp-url" placeholder="rtsp://">
  <button type="submit">Add Camera</button>
</form>
<div id="region-modals" class="region"></div>
<script>
const post = (path, body) => fetch('/api/actions/' + path, {
  method: 'POST',
  headers: { 'Content-Type': 'application/json' },
  body: JSON.stringify(body || {})
});

function regionNode(name) {
  let node = document.getElementById('region-' + name);
  if (!node) {
    node = document.createElement('section');
    node.id = 'region-' + name;
    node.className = 'region';
    document.getElementById('page').appendChild(node);
  }
  return node;
}

function build(view) {
  if (typeof view === 'string') return document.createTextNode(view);
  const el = document.createElement(view.tag);
  if (view.classes) el.className = view.classes.join(' ');
  for (const [k, v] of Object.entries(view.attrs || {})) el.setAttribute(k, v);
  for (const [k, v] of Object.entries(view.style || {})) el.style.setProperty(k, v);
  for (const child of view.children || []) el.appendChild(build(child));
  return el;
}

function paint(name, view) {
  const node = regionNode(name);
  node.replaceChildren(build(view));
}

function mount(snapshot) {
  document.getElementById('page').replaceChildren();
  document.getElementById('add-camera-form').hidden = snapshot.page !== 'admin_cameras';
  for (const [name, view] of Object.entries(snapshot.regions)) paint(name, view);
  if (location.pathname !== snapshot.location.split('?')[0]) history.pushState({}, '', snapshot.location);
}

async function refresh() {
  mount(await (await fetch('/api/views')).json());
}

function connect() {
  const ws = new WebSocket((location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '/ws/views');
  ws.onmessage = (msg) => {
    const ev = JSON.parse(msg.data);
    if (ev.type === 'snapshot') mount(ev.snapshot);
    else if (ev.type === 'region') paint(ev.region, ev.view);
    else if (ev.type === 'mounted') refresh();
    else if (ev.type === 'navigated') history.pushState({}, '', ev.location);
  };
  ws.onclose = () => setTimeout(connect, 1000);
}

const val = (id) => (document.getElementById(id) || {}).value || '';

document.addEventListener('click', (e) => {
  const nav = e.target.closest('[data-nav]');
  if (nav) {
    e.preventDefault();
    post('navigate', { location: nav.getAttribute('href') });
    return;
  }
  const dialog = e.target.closest('[data-dialog-id]');
  if (dialog && e.target.tagName === 'BUTTON') {
    const id = dialog.getAttribute('data-dialog-id');
    const confirmed = e.target.classList.contains('confirm-btn') ? true
      : e.target.classList.contains('cancel-btn') ? false : null;
    post('dialogs/' + id, { confirmed });
    return;
  }
  const btn = e.target.closest('[data-action]');
  if (!btn || btn.disabled) return;
  e.preventDefault();
  const id = btn.getAttribute('data-id');
  switch (btn.getAttribute('data-action')) {
    case 'verify-alert': post('alerts/' + id + '/verify'); break;
    case 'dismiss-alert': post('alerts/' + id + '/dismiss'); break;
    case 'filter-alerts': post('alerts/filter', { status: btn.getAttribute('data-status') }); break;
    case 'activate-camera': post('cameras/' + id + '/activate'); break;
    case 'edit-camera': post('cameras/' + id + '/edit'); break;
    case 'delete-camera': post('cameras/' + id + '/delete'); break;
    case 'show-sign-up': post('show_sign_up'); break;
    case 'show-sign-in': post('show_sign_in'); break;
  }
});

document.addEventListener('submit', (e) => {
  e.preventDefault();
  switch (e.target.id) {
    case 'signIn': post('sign_in', { email: val('email'), password: val('password') }); break;
    case 'signup': post('sign_up', { email: val('rEmail'), password: val('rPassword'), first_name: val('fName'), last_name: val('lName') }); break;
    case 'edit-camera-form': post('cameras/edit', { name: val('edit-camera-name'), rtspUrl: val('edit-rtsp-url') }); break;
    case 'add-camera-form': post('cameras', { name: val('camera-name'), rtspUrl: val('rtsp-url') }).then(() => e.target.reset()); break;
    case 'change-password-form': post('change_password', { new_password: val('new-password'), confirm_password: val('confirm-password') }); break;
  }
});

document.addEventListener('change', (e) => {
  if (e.target.id === 'dark-mode-toggle') post('preferences', { dark_mode: e.target.checked });
  if (e.target.id === 'personnel-language') post('preferences/language', { language: e.target.value });
});

document.addEventListener('keydown', (e) => { if (e.key === 'Escape') post('dialogs/close'); });
document.getElementById('logout-button').addEventListener('click', () => post('logout'));
window.addEventListener('popstate', () => post('navigate', { location: location.pathname }));

post('navigate', { location: location.pathname + location.search }).then(connect);
</script>
</body>
</html>
"##;
