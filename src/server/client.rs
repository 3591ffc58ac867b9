// src/server/client.rs

//! Browser side of live reload.

/// Path of the Server-Sent-Events stream the client subscribes to.
pub const EVENTS_PATH: &str = "/__assetpipe/events";

const CLIENT_TEMPLATE: &str = r##"<script data-assetpipe>
(function () {
  var notifyOnConnect = __NOTIFY__;
  var source = new EventSource("__EVENTS__");

  function popup(text, isError) {
    var el = document.createElement("div");
    el.textContent = text;
    el.style.cssText = "position:fixed;top:0;right:0;z-index:2147483647;padding:10px 15px;" +
      "font:14px/1.4 monospace;white-space:pre-wrap;max-width:60vw;color:#fff;background:" +
      (isError ? "#c0392b" : "#1f2b33");
    document.body.appendChild(el);
    setTimeout(function () { el.remove(); }, isError ? 8000 : 2000);
  }

  source.addEventListener("connected", function () {
    if (notifyOnConnect) popup("Connected to assetpipe", false);
  });
  source.addEventListener("reload", function () {
    window.location.reload();
  });
  source.addEventListener("inject", function (e) {
    var path = JSON.parse(e.data).path;
    var name = path.split("/").pop();
    var links = document.querySelectorAll('link[rel="stylesheet"]');
    var matched = false;
    links.forEach(function (link) {
      var href = link.getAttribute("href") || "";
      if (href.split("?")[0].split("/").pop() === name) {
        link.href = href.split("?")[0] + "?assetpipe=" + Date.now();
        matched = true;
      }
    });
    if (!matched && links.length === 0) window.location.reload();
  });
  source.addEventListener("error", function (e) {
    if (!e.data) return;
    var payload = JSON.parse(e.data);
    popup(payload.title + "\n" + payload.message, true);
  });
})();
</script>"##;

/// The client `<script>` block.
pub fn client_script(notify_on_connect: bool) -> String {
    CLIENT_TEMPLATE
        .replace("__NOTIFY__", if notify_on_connect { "true" } else { "false" })
        .replace("__EVENTS__", EVENTS_PATH)
}

/// Insert `script` before the last `</body>`, or append it when there is none.
pub fn inject_client(html: &str, script: &str) -> String {
    let lower = html.to_ascii_lowercase();
    match lower.rfind("</body>") {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + script.len());
            out.push_str(&html[..at]);
            out.push_str(script);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{html}{script}"),
    }
}
